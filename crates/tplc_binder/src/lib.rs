//! tplc_binder: Reactive dependency analysis.
//!
//! The analyzer extracts `$`-sigil references from initializers and names
//! the update triggers of a reactive declaration. The binder runs after a
//! full parse and resolves every dependency against the reactive
//! declarations of the same file, so forward references are legal.

mod binder;
mod reactive;

pub use binder::{Binder, DependencyGraph};
pub use reactive::{analyze_dependencies, analyze_update_triggers, collect_references};
