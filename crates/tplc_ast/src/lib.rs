//! tplc_ast: Abstract Syntax Tree definitions for the template language.
//!
//! This module defines the token kinds, the semantic type descriptor, the
//! declaration/expression node sum types and the visitor used to walk them.

pub mod node;
pub mod syntax_kind;
pub mod types;
pub mod visitor;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
