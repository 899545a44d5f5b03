//! Source locations.
//!
//! Every token, AST node and diagnostic records where it originates in the
//! source text.

use serde::Serialize;
use std::fmt;

/// A resolved location in source text.
///
/// `line` and `column` are 1-based, `index` is the 0-based byte offset.
/// Every token, AST node, and diagnostic carries one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub index: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32, index: u32) -> Self {
        Self {
            line,
            column,
            index,
        }
    }

    /// The location of the first character of a file.
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }

    /// Shift this location by a number of lines and bytes.
    ///
    /// Used when a body was cut out of a larger file and locations must
    /// point into the original text again.
    pub fn shifted(self, lines: u32, bytes: u32) -> Self {
        Self {
            line: self.line + lines,
            column: self.column,
            index: self.index + bytes,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_location() {
        assert_eq!(SourceLocation::start(), SourceLocation::new(1, 1, 0));
    }

    #[test]
    fn test_shifted_location() {
        let loc = SourceLocation::new(2, 4, 10).shifted(3, 20);
        assert_eq!(loc, SourceLocation::new(5, 4, 30));
        assert_eq!(loc.to_string(), "5:4");
    }
}
