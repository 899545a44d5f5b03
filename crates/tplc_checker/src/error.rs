//! The annotation conflict error.

use thiserror::Error;
use tplc_ast::types::TypeInfo;
use tplc_core::text::SourceLocation;
use tplc_diagnostics::{messages, Diagnostic};

/// An explicit annotation disagrees with the type inferred from the initializer.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{location}: type annotation '{annotation}' of '{name}' conflicts with inferred type '{inferred}'")]
pub struct TypeValidationError {
    pub name: String,
    pub annotation: TypeInfo,
    pub inferred: TypeInfo,
    pub location: SourceLocation,
}

impl TypeValidationError {
    /// The same conflict as an advisory diagnostic, for callers that
    /// downgrade type errors.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let annotation = self.annotation.to_string();
        let inferred = self.inferred.to_string();
        Diagnostic::new(
            self.location,
            &messages::TYPE_ANNOTATION_CONFLICT,
            &[&annotation, &self.name, &inferred],
        )
        .with_length(self.name.len() as u32 + 1)
    }
}
