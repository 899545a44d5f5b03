//! tplc_parser: Recursive descent parser for the template language.
//!
//! Turns a template body into a [`Program`](tplc_ast::Program). A parse runs
//! the syntax-version detector, the scanner, the parser (which drives the
//! statement-termination engine and the type checker as it goes) and finally
//! the dependency binder. Every parse owns its state through a
//! [`ParserSession`]; nothing is shared between files.

pub mod asi;
pub mod detect;
mod error;
mod expression;
mod parser;
mod session;

pub use detect::{detect, detect_syntax_version, Detection};
pub use error::{FrontendError, ParseError};
pub use parser::Parser;
pub use session::{parse, parse_modern, ParseOptions, ParseOutput, ParserSession};
