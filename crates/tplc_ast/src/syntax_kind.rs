//! SyntaxKind enum - all token kinds of the template language.

use serde::Serialize;

/// The kind of a token produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum SyntaxKind {
    // ========================================================================
    // Structure
    // ========================================================================
    EndOfFileToken,
    NewLineToken,

    // Literals
    NumericLiteral,
    StringLiteral,
    TemplateLiteral,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,

    Identifier,

    // ========================================================================
    // Sigils and punctuation
    // ========================================================================
    DollarToken,
    ColonToken,
    EqualsToken,
    ExclamationToken,
    SemicolonToken,
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    OpenBracketToken,
    CloseBracketToken,
    CommaToken,
    EqualsGreaterThanToken,
    DotToken,
    DotDotDotToken,
    QuestionToken,
    QuestionDotToken,

    // ========================================================================
    // Operators
    // ========================================================================
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsToken,
    ExclamationEqualsEqualsToken,
    AmpersandToken,
    AmpersandAmpersandToken,
    BarToken,
    BarBarToken,
    QuestionQuestionToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    SlashEqualsToken,

    // ========================================================================
    // Keywords
    // ========================================================================
    ClassKeyword,
    FunctionKeyword,
    LetKeyword,
    ConstKeyword,
    VarKeyword,
    ReturnKeyword,
    ThrowKeyword,
    BreakKeyword,
    ContinueKeyword,
    AsyncKeyword,
    AwaitKeyword,
    PublicKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    ReadonlyKeyword,
}

impl SyntaxKind {
    /// Whether this token is a literal value.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::NumericLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TemplateLiteral
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::NullKeyword
        )
    }

    /// Whether this token is a reserved word.
    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::ClassKeyword
    }

    /// Whether this token is an access modifier usable on constructor parameters.
    pub fn is_accessibility_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::ReadonlyKeyword
        )
    }

    /// Whether this token is a binary operator (including assignment forms).
    pub fn is_binary_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::PlusToken
                | SyntaxKind::MinusToken
                | SyntaxKind::AsteriskToken
                | SyntaxKind::AsteriskAsteriskToken
                | SyntaxKind::SlashToken
                | SyntaxKind::PercentToken
                | SyntaxKind::LessThanToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::LessThanEqualsToken
                | SyntaxKind::GreaterThanEqualsToken
                | SyntaxKind::EqualsEqualsToken
                | SyntaxKind::EqualsEqualsEqualsToken
                | SyntaxKind::ExclamationEqualsToken
                | SyntaxKind::ExclamationEqualsEqualsToken
                | SyntaxKind::AmpersandToken
                | SyntaxKind::AmpersandAmpersandToken
                | SyntaxKind::BarToken
                | SyntaxKind::BarBarToken
                | SyntaxKind::QuestionQuestionToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::ColonToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::PlusEqualsToken
                | SyntaxKind::MinusEqualsToken
                | SyntaxKind::AsteriskEqualsToken
                | SyntaxKind::SlashEqualsToken
        )
    }

    /// Whether a line ending with this token cannot end a statement.
    ///
    /// Such lines always continue onto the next line.
    pub fn expects_continuation(self) -> bool {
        self.is_binary_operator()
            || matches!(
                self,
                SyntaxKind::CommaToken
                    | SyntaxKind::EqualsGreaterThanToken
                    | SyntaxKind::OpenParenToken
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::OpenBraceToken
                    | SyntaxKind::DotToken
                    | SyntaxKind::QuestionDotToken
                    | SyntaxKind::ExclamationToken
                    | SyntaxKind::DotDotDotToken
            )
    }

    /// Whether this token may either start a new statement or continue the
    /// previous expression when it opens a line.
    pub fn is_restricted(self) -> bool {
        matches!(
            self,
            SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken | SyntaxKind::TemplateLiteral
        )
    }

    /// Look up the keyword kind for an identifier-shaped word.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "null" => SyntaxKind::NullKeyword,
            "class" => SyntaxKind::ClassKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "let" => SyntaxKind::LetKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "var" => SyntaxKind::VarKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "throw" => SyntaxKind::ThrowKeyword,
            "break" => SyntaxKind::BreakKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "async" => SyntaxKind::AsyncKeyword,
            "await" => SyntaxKind::AwaitKeyword,
            "public" => SyntaxKind::PublicKeyword,
            "private" => SyntaxKind::PrivateKeyword,
            "protected" => SyntaxKind::ProtectedKeyword,
            "readonly" => SyntaxKind::ReadonlyKeyword,
            _ => return None,
        };
        Some(kind)
    }

    /// The fixed source text of a punctuation or operator token.
    pub fn punctuation_text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::DollarToken => "$",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::ExclamationToken => "!",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::EqualsGreaterThanToken => "=>",
            SyntaxKind::DotToken => ".",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::QuestionDotToken => "?.",
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::AsteriskAsteriskToken => "**",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::PercentToken => "%",
            SyntaxKind::PlusPlusToken => "++",
            SyntaxKind::MinusMinusToken => "--",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::LessThanEqualsToken => "<=",
            SyntaxKind::GreaterThanEqualsToken => ">=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::EqualsEqualsEqualsToken => "===",
            SyntaxKind::ExclamationEqualsToken => "!=",
            SyntaxKind::ExclamationEqualsEqualsToken => "!==",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::BarToken => "|",
            SyntaxKind::BarBarToken => "||",
            SyntaxKind::QuestionQuestionToken => "??",
            SyntaxKind::PlusEqualsToken => "+=",
            SyntaxKind::MinusEqualsToken => "-=",
            SyntaxKind::AsteriskEqualsToken => "*=",
            SyntaxKind::SlashEqualsToken => "/=",
            _ => return None,
        };
        Some(text)
    }

    /// A short human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        if let Some(text) = self.punctuation_text() {
            return text;
        }
        match self {
            SyntaxKind::EndOfFileToken => "end of input",
            SyntaxKind::NewLineToken => "line break",
            SyntaxKind::NumericLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::TemplateLiteral => "template literal",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::NullKeyword => "null",
            SyntaxKind::ClassKeyword => "class",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::LetKeyword => "let",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::VarKeyword => "var",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::ThrowKeyword => "throw",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::AsyncKeyword => "async",
            SyntaxKind::AwaitKeyword => "await",
            SyntaxKind::PublicKeyword => "public",
            SyntaxKind::PrivateKeyword => "private",
            SyntaxKind::ProtectedKeyword => "protected",
            SyntaxKind::ReadonlyKeyword => "readonly",
            _ => "token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(SyntaxKind::from_keyword("class"), Some(SyntaxKind::ClassKeyword));
        assert_eq!(SyntaxKind::from_keyword("true"), Some(SyntaxKind::TrueKeyword));
        assert_eq!(SyntaxKind::from_keyword("trueValue"), None);
        assert!(SyntaxKind::ReadonlyKeyword.is_keyword());
        assert!(!SyntaxKind::Identifier.is_keyword());
    }

    #[test]
    fn test_restricted_tokens() {
        assert!(SyntaxKind::OpenParenToken.is_restricted());
        assert!(SyntaxKind::TemplateLiteral.is_restricted());
        assert!(!SyntaxKind::StringLiteral.is_restricted());
    }
}
