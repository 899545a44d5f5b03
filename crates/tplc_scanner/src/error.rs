//! Fatal tokenizer errors.

use thiserror::Error;
use tplc_core::text::SourceLocation;

/// A character that cannot start any token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid character {ch:?} at {location}")]
pub struct TokenizationError {
    pub location: SourceLocation,
    pub ch: char,
}
