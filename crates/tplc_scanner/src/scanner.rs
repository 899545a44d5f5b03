//! The template-language scanner.
//!
//! Converts source text into a flat list of tokens in one pass without
//! backtracking. Multi-character operators are matched greedily before their
//! single-character prefixes.

use crate::char_codes::*;
use crate::error::TokenizationError;
use crate::token::Token;
use tplc_ast::syntax_kind::SyntaxKind;
use tplc_core::text::SourceLocation;
use tplc_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// Tokenize a whole source text, discarding advisory diagnostics.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizationError> {
    Scanner::new(source).tokenize()
}

/// The scanner converts template-language source text into tokens.
pub struct Scanner {
    /// The source text being scanned.
    text: Vec<char>,
    /// Current position in `text` (character index).
    pos: usize,
    /// Byte offset of `pos`.
    byte_pos: u32,
    /// 1-based line of `pos`.
    line: u32,
    /// 1-based column of `pos`.
    column: u32,
    /// Start of the current token.
    token_start: usize,
    token_location: SourceLocation,
    /// Whether the last emitted token was a line break.
    after_line_break: bool,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().collect(),
            pos: 0,
            byte_pos: 0,
            line: 1,
            column: 1,
            token_start: 0,
            token_location: SourceLocation::start(),
            after_line_break: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Scan every token up to and including the end-of-input token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, TokenizationError> {
        let mut tokens = Vec::with_capacity(self.text.len() / 3 + 1);
        loop {
            let token = self.scan()?;
            let done = token.is(SyntaxKind::EndOfFileToken);
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text.get(self.pos + offset).copied()
    }

    /// Advance one character on the current line.
    #[inline]
    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += 1;
            self.byte_pos += ch.len_utf8() as u32;
            self.column += 1;
        }
    }

    #[inline]
    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Advance over one line break (`\r\n` counts as one).
    fn advance_line_break(&mut self) {
        let was_cr = self.current_char() == Some('\r');
        self.advance();
        if was_cr && self.current_char() == Some('\n') {
            self.advance();
        }
        self.line += 1;
        self.column = 1;
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.byte_pos)
    }

    fn report(&mut self, message: &DiagnosticMessage) {
        let length = self.byte_pos - self.token_location.index;
        self.diagnostics
            .add(Diagnostic::new(self.token_location, message, &[]).with_length(length));
    }

    /// Skip spaces and comments. Returns true if a block comment spanned a line break.
    fn skip_trivia(&mut self) -> bool {
        let mut crossed_line = false;
        while let Some(ch) = self.current_char() {
            match ch {
                '/' if self.char_at(1) == Some('/') => {
                    while let Some(c) = self.current_char() {
                        if is_line_break(c) {
                            break;
                        }
                        self.advance();
                    }
                }
                '/' if self.char_at(1) == Some('*') => {
                    self.token_location = self.location();
                    self.advance_by(2);
                    let mut closed = false;
                    while let Some(c) = self.current_char() {
                        if c == '*' && self.char_at(1) == Some('/') {
                            self.advance_by(2);
                            closed = true;
                            break;
                        }
                        if is_line_break(c) {
                            crossed_line = true;
                            self.advance_line_break();
                        } else {
                            self.advance();
                        }
                    }
                    if !closed {
                        self.report(&messages::UNTERMINATED_COMMENT);
                    }
                }
                c if is_white_space_single_line(c) => self.advance(),
                _ => break,
            }
        }
        crossed_line
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Result<Token, TokenizationError> {
        let crossed_line = self.skip_trivia();
        self.token_start = self.pos;
        self.token_location = self.location();

        if crossed_line {
            return Ok(self.finish(SyntaxKind::NewLineToken, None));
        }

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Ok(self.finish(SyntaxKind::EndOfFileToken, None)),
        };

        if is_line_break(ch) {
            self.advance_line_break();
            return Ok(self.finish(SyntaxKind::NewLineToken, None));
        }

        let kind = match ch {
            '$' => self.single(SyntaxKind::DollarToken),
            ':' => self.single(SyntaxKind::ColonToken),
            ';' => self.single(SyntaxKind::SemicolonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            '%' => self.single(SyntaxKind::PercentToken),

            '=' => self.scan_equals(),
            '!' => self.scan_exclamation(),
            '.' => {
                if self.char_at(1).map_or(false, is_digit) {
                    return Ok(self.scan_number());
                }
                self.scan_dot()
            }
            '?' => self.scan_question(),
            '+' => self.scan_operator(&[("++", SyntaxKind::PlusPlusToken), ("+=", SyntaxKind::PlusEqualsToken)], SyntaxKind::PlusToken),
            '-' => self.scan_operator(&[("--", SyntaxKind::MinusMinusToken), ("-=", SyntaxKind::MinusEqualsToken)], SyntaxKind::MinusToken),
            '*' => self.scan_operator(&[("**", SyntaxKind::AsteriskAsteriskToken), ("*=", SyntaxKind::AsteriskEqualsToken)], SyntaxKind::AsteriskToken),
            '/' => self.scan_operator(&[("/=", SyntaxKind::SlashEqualsToken)], SyntaxKind::SlashToken),
            '<' => self.scan_operator(&[("<=", SyntaxKind::LessThanEqualsToken)], SyntaxKind::LessThanToken),
            '>' => self.scan_operator(&[(">=", SyntaxKind::GreaterThanEqualsToken)], SyntaxKind::GreaterThanToken),
            '&' => self.scan_operator(&[("&&", SyntaxKind::AmpersandAmpersandToken)], SyntaxKind::AmpersandToken),
            '|' => self.scan_operator(&[("||", SyntaxKind::BarBarToken)], SyntaxKind::BarToken),

            '\'' | '"' | '`' => return Ok(self.scan_string_literal(ch)),

            '0'..='9' => return Ok(self.scan_number()),

            _ if is_identifier_start(ch) => return Ok(self.scan_identifier()),

            _ => {
                return Err(TokenizationError {
                    location: self.token_location,
                    ch,
                })
            }
        };

        Ok(self.finish(kind, None))
    }

    /// Build a token spanning from `token_start` to the current position.
    fn finish(&mut self, kind: SyntaxKind, value: Option<String>) -> Token {
        let text: String = self.text[self.token_start..self.pos].iter().collect();
        let token = Token {
            kind,
            value: value.unwrap_or_else(|| text.clone()),
            text,
            line: self.token_location.line,
            column: self.token_location.column,
            offset: self.token_location.index,
            preceded_by_line_break: self.after_line_break,
        };
        self.after_line_break = kind == SyntaxKind::NewLineToken;
        token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.advance();
        kind
    }

    /// Match the longest of `candidates` at the current position, else `fallback`.
    fn scan_operator(&mut self, candidates: &[(&str, SyntaxKind)], fallback: SyntaxKind) -> SyntaxKind {
        for (text, kind) in candidates {
            if self.matches(text) {
                self.advance_by(text.chars().count());
                return *kind;
            }
        }
        self.advance();
        fallback
    }

    fn matches(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, expected)| self.char_at(i) == Some(expected))
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        self.scan_operator(
            &[
                ("===", SyntaxKind::EqualsEqualsEqualsToken),
                ("==", SyntaxKind::EqualsEqualsToken),
                ("=>", SyntaxKind::EqualsGreaterThanToken),
            ],
            SyntaxKind::EqualsToken,
        )
    }

    fn scan_exclamation(&mut self) -> SyntaxKind {
        self.scan_operator(
            &[
                ("!==", SyntaxKind::ExclamationEqualsEqualsToken),
                ("!=", SyntaxKind::ExclamationEqualsToken),
            ],
            SyntaxKind::ExclamationToken,
        )
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        self.scan_operator(&[("...", SyntaxKind::DotDotDotToken)], SyntaxKind::DotToken)
    }

    fn scan_question(&mut self) -> SyntaxKind {
        if self.matches("?.") && !self.char_at(2).map_or(false, is_digit) {
            self.advance_by(2);
            return SyntaxKind::QuestionDotToken;
        }
        self.scan_operator(&[("??", SyntaxKind::QuestionQuestionToken)], SyntaxKind::QuestionToken)
    }

    /// Scan a quoted literal. Unterminated literals run to end of input.
    fn scan_string_literal(&mut self, quote: char) -> Token {
        let kind = if quote == '`' {
            SyntaxKind::TemplateLiteral
        } else {
            SyntaxKind::StringLiteral
        };
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            let ch = match self.current_char() {
                Some(ch) => ch,
                None => {
                    let message = if kind == SyntaxKind::TemplateLiteral {
                        &messages::UNTERMINATED_TEMPLATE_LITERAL
                    } else {
                        &messages::UNTERMINATED_STRING_LITERAL
                    };
                    self.report(message);
                    break;
                }
            };
            if ch == quote {
                self.advance();
                break;
            }
            if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char() {
                    if is_line_break(escaped) {
                        // line continuation
                        self.advance_line_break();
                        continue;
                    }
                    value.push(unescape(escaped));
                    self.advance();
                }
                continue;
            }
            if is_line_break(ch) {
                value.push('\n');
                self.advance_line_break();
                continue;
            }
            value.push(ch);
            self.advance();
        }
        self.finish(kind, Some(value))
    }

    fn scan_number(&mut self) -> Token {
        if self.current_char() == Some('0') {
            let radix = match self.char_at(1) {
                Some('x') | Some('X') => Some(16),
                Some('b') | Some('B') => Some(2),
                Some('o') | Some('O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance_by(2);
                self.scan_digits(radix);
                return self.finish_number();
            }
        }

        self.scan_digits(10);
        if self.current_char() == Some('.') && self.char_at(1).map_or(false, is_digit) {
            self.advance();
            self.scan_digits(10);
        }
        if let Some('e') | Some('E') = self.current_char() {
            let sign = matches!(self.char_at(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.char_at(digit_at).map_or(false, is_digit) {
                self.advance_by(digit_at);
                self.scan_digits(10);
            }
        }
        self.finish_number()
    }

    fn finish_number(&mut self) -> Token {
        let value: String = self.text[self.token_start..self.pos]
            .iter()
            .filter(|&&c| c != '_')
            .collect();
        self.finish(SyntaxKind::NumericLiteral, Some(value))
    }

    fn scan_digits(&mut self, radix: u32) {
        while let Some(ch) = self.current_char() {
            if ch == '_' || ch.is_digit(radix) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Keyword-like words are only keywords when the whole word matches,
    /// so `trueValue` stays an identifier.
    fn scan_identifier(&mut self) -> Token {
        self.advance();
        while self.current_char().map_or(false, is_identifier_part) {
            self.advance();
        }
        let text: String = self.text[self.token_start..self.pos].iter().collect();
        let kind = SyntaxKind::from_keyword(&text).unwrap_or(SyntaxKind::Identifier);
        self.finish(kind, None)
    }
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'v' => '\u{000B}',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_positions() {
        let tokens = tokenize("$a = 1\n  b").unwrap();
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(b.line, 2);
        assert_eq!(b.column, 3);
        assert_eq!(b.offset, 9);
        assert!(b.preceded_by_line_break);
    }

    #[test]
    fn test_unterminated_string_reports_diagnostic() {
        let mut scanner = Scanner::new("\"open");
        let tokens = scanner.tokenize().unwrap();
        assert_eq!(tokens[0].kind, SyntaxKind::StringLiteral);
        assert_eq!(tokens[0].value, "open");
        assert_eq!(scanner.diagnostics().len(), 1);
    }

    #[test]
    fn test_block_comment_across_lines_is_a_line_break() {
        let tokens = tokenize("a /* x\n y */ b").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::NewLineToken,
                SyntaxKind::Identifier,
                SyntaxKind::EndOfFileToken
            ]
        );
    }
}
