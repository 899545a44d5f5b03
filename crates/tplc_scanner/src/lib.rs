//! tplc_scanner: Tokenizer for template-language source text.
//!
//! A single left-to-right scan producing a flat token list with source
//! positions. Line breaks are kept as tokens because statement termination
//! depends on them. The only fatal condition is a character that cannot
//! start any token.

mod char_codes;
mod error;
mod scanner;
mod token;

pub use error::TokenizationError;
pub use scanner::{tokenize, Scanner};
pub use token::Token;
