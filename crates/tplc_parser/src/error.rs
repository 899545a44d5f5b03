//! Fatal frontend errors.

use thiserror::Error;
use tplc_checker::TypeValidationError;
use tplc_core::text::SourceLocation;
use tplc_scanner::TokenizationError;

/// An expected token was not found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{location}: {message}, found {actual}")]
pub struct ParseError {
    pub location: SourceLocation,
    pub message: String,
    /// Description of the token that was found instead.
    pub actual: String,
}

/// Any error that stops a parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrontendError {
    #[error("tokenization error: {0}")]
    Tokenization(#[from] TokenizationError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("type error: {0}")]
    TypeValidation(#[from] TypeValidationError),
}

impl FrontendError {
    pub fn location(&self) -> SourceLocation {
        match self {
            FrontendError::Tokenization(e) => e.location,
            FrontendError::Parse(e) => e.location,
            FrontendError::TypeValidation(e) => e.location,
        }
    }

    /// Move the error's location by a number of lines and bytes.
    pub fn shifted(mut self, lines: u32, bytes: u32) -> Self {
        match &mut self {
            FrontendError::Tokenization(e) => e.location = e.location.shifted(lines, bytes),
            FrontendError::Parse(e) => e.location = e.location.shifted(lines, bytes),
            FrontendError::TypeValidation(e) => e.location = e.location.shifted(lines, bytes),
        }
        self
    }

    /// Byte length of the offending text, when known.
    pub fn length(&self) -> u32 {
        match self {
            FrontendError::Tokenization(e) => e.ch.len_utf8() as u32,
            FrontendError::Parse(_) => 1,
            FrontendError::TypeValidation(e) => e.name.len() as u32 + 1,
        }
    }
}
