//! tplc_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Diagnostics are advisory: they never stop a parse. Fatal conditions are
//! modelled as error types in the crates that raise them. Every diagnostic
//! carries a numbered message, a category, a source location and, where the
//! fix is mechanical, a suggestion.

use serde::Serialize;
use std::fmt;
use tplc_core::text::SourceLocation;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
            DiagnosticCategory::Suggestion => write!(f, "suggestion"),
            DiagnosticCategory::Message => write!(f, "message"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1201, 3001).
    pub code: u32,
    /// The default category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// The file path where this diagnostic occurred, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Where the diagnostic points.
    pub location: SourceLocation,
    /// Length in bytes of the offending text, starting at `location.index`.
    pub length: u32,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
    /// A human-readable fix, if one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic at a location.
    pub fn new(location: SourceLocation, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            location,
            length: 0,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            suggestion: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:", file)?;
        }
        write!(
            f,
            "{}: {} TP{}: {}",
            self.location, self.category, self.code, self.message_text
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during one parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Diagnostic> {
        self.diagnostics.iter_mut()
    }

    /// Sort diagnostics by source position, keeping insertion order for ties.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| d.location.index);
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
        ($code:expr, Suggestion, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Suggestion, message: $msg }
        };
        ($code:expr, Message, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Message, message: $msg }
        };
    }

    // ========================================================================
    // Tokenizer (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1002, Warning, "Unterminated string literal.");
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage = diag!(1003, Warning, "Unterminated template literal.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1004, Warning, "'*/' expected.");

    // ========================================================================
    // Statement termination (1200-1299)
    // ========================================================================
    pub const STATEMENT_CONTINUATION: DiagnosticMessage = diag!(1201, Warning, "Line {0} starts with '{1}' and may continue the statement on line {2}.");
    pub const BINARY_OPERATOR_CONTINUATION: DiagnosticMessage = diag!(1202, Warning, "Line {0} starts with operator '{1}' and may continue the statement on line {2}.");

    // ========================================================================
    // Types (2000-2099)
    // ========================================================================
    pub const TYPE_ANNOTATION_CONFLICT: DiagnosticMessage = diag!(2001, Error, "Type annotation '{0}' of '{1}' conflicts with inferred type '{2}'.");

    // ========================================================================
    // Reactive dependencies (3000-3099)
    // ========================================================================
    pub const DEPENDENCY_NOT_REACTIVE: DiagnosticMessage = diag!(3001, Warning, "'${0}' is referenced by reactive '${1}' but is not declared reactive.");
    pub const DEPENDENCY_NOT_DECLARED: DiagnosticMessage = diag!(3002, Warning, "'${0}' is referenced by reactive '${1}' but is not declared in any enclosing scope.");
    pub const SELF_DEPENDENCY: DiagnosticMessage = diag!(3003, Warning, "Reactive '${0}' depends on itself.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, index: u32) -> SourceLocation {
        SourceLocation::new(line, 1, index)
    }

    #[test]
    fn test_format_message() {
        let msg = format_message("Type '{0}' is not assignable to type '{1}'.", &["number", "string"]);
        assert_eq!(msg, "Type 'number' is not assignable to type 'string'.");
    }

    #[test]
    fn test_format_message_no_args() {
        let msg = format_message("Unterminated string literal.", &[]);
        assert_eq!(msg, "Unterminated string literal.");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(at(2, 7), &messages::SELF_DEPENDENCY, &["count"])
            .with_file("counter.tpl")
            .with_suggestion("remove the self reference");
        let display = format!("{}", diag);
        assert!(display.starts_with("counter.tpl:2:1"));
        assert!(display.contains("TP3003"));
        assert!(display.contains("$count"));
        assert!(display.contains("remove the self reference"));
    }

    #[test]
    fn test_category_override() {
        let diag = Diagnostic::new(at(1, 0), &messages::TYPE_ANNOTATION_CONFLICT, &["string", "price", "float"]);
        assert!(diag.is_error());
        let diag = diag.with_category(DiagnosticCategory::Warning);
        assert!(!diag.is_error());
        assert_eq!(diag.code, 2001);
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new();
        assert!(collection.is_empty());

        collection.add(Diagnostic::new(at(1, 0), &messages::TYPE_ANNOTATION_CONFLICT, &["a", "b", "c"]));
        collection.add(Diagnostic::new(at(1, 0), &messages::SELF_DEPENDENCY, &["x"]));
        assert!(collection.has_errors());
        assert_eq!(collection.error_count(), 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_diagnostic_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::new(at(3, 40), &messages::SELF_DEPENDENCY, &["b"]));
        collection.add(Diagnostic::new(at(1, 5), &messages::SELF_DEPENDENCY, &["a"]));
        collection.sort();
        assert_eq!(collection.diagnostics()[0].location.index, 5);
        assert_eq!(collection.diagnostics()[1].location.index, 40);
    }
}
