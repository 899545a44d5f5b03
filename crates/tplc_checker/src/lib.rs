//! tplc_checker: The type inference engine.
//!
//! Assigns a [`TypeInfo`](tplc_ast::TypeInfo) to every declaration from its
//! initializer, resolves written annotations, and validates annotations
//! against inferred types. Inference is literal-driven and never fails;
//! the only error it raises is an annotation conflict.

pub mod annotation;
mod checker;
mod error;
mod symbol;

pub use checker::{TypeChecker, TypeConflict, ValidationResult};
pub use error::TypeValidationError;
pub use symbol::SymbolTable;
