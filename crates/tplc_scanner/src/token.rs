//! Tokens produced by the scanner.

use tplc_ast::syntax_kind::SyntaxKind;
use tplc_core::text::SourceLocation;

/// A scanned token. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// The source text of the token exactly as written.
    pub text: String,
    /// The cooked value: string contents with escapes resolved, otherwise `text`.
    pub value: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub column: u32,
    /// Byte offset from the start of the source.
    pub offset: u32,
    /// Whether a line break separates this token from the previous one.
    pub preceded_by_line_break: bool,
}

impl Token {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    #[inline]
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }
}
