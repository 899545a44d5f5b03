//! Scanner integration tests.
//!
//! Verifies that the scanner correctly tokenizes both dialects.

use tplc_ast::syntax_kind::SyntaxKind;
use tplc_scanner::{tokenize, Scanner, TokenizationError};

/// Helper: scan all tokens from source and return as (kind, value) pairs,
/// excluding line breaks and the end-of-input token.
fn scan_all(source: &str) -> Vec<(SyntaxKind, String)> {
    tokenize(source)
        .unwrap()
        .into_iter()
        .filter(|t| !t.is(SyntaxKind::NewLineToken) && !t.is(SyntaxKind::EndOfFileToken))
        .map(|t| (t.kind, t.value))
        .collect()
}

/// Helper: scan all token kinds, line breaks included.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_empty_source() {
    assert_eq!(scan_kinds(""), vec![SyntaxKind::EndOfFileToken]);
}

#[test]
fn test_whitespace_only() {
    assert!(scan_all("   \t  ").is_empty());
    assert_eq!(
        scan_kinds("  \n\t"),
        vec![SyntaxKind::NewLineToken, SyntaxKind::EndOfFileToken]
    );
}

#[test]
fn test_reactive_declaration_tokens() {
    assert_eq!(
        scan_kinds("$count! = 0"),
        vec![
            SyntaxKind::DollarToken,
            SyntaxKind::Identifier,
            SyntaxKind::ExclamationToken,
            SyntaxKind::EqualsToken,
            SyntaxKind::NumericLiteral,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_marker_followed_by_equals_is_not_equality() {
    // `!=` is scanned greedily; the parser splits it back into marker and `=`.
    let kinds = scan_kinds("$a!= 1");
    assert_eq!(kinds[2], SyntaxKind::ExclamationEqualsToken);
}

#[test]
fn test_numeric_literals() {
    let tokens = scan_all("42");
    assert_eq!(tokens, vec![(SyntaxKind::NumericLiteral, "42".to_string())]);

    let tokens = scan_all("3.14");
    assert_eq!(tokens, vec![(SyntaxKind::NumericLiteral, "3.14".to_string())]);

    let tokens = scan_all("1_000");
    assert_eq!(tokens, vec![(SyntaxKind::NumericLiteral, "1000".to_string())]);

    let tokens = scan_all("0xFF");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].0, SyntaxKind::NumericLiteral);

    let tokens = scan_all("1e10");
    assert_eq!(tokens.len(), 1);

    // Member access on an integer is not a decimal point.
    assert_eq!(
        scan_kinds("1.toString"),
        vec![
            SyntaxKind::NumericLiteral,
            SyntaxKind::DotToken,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_string_literals() {
    let tokens = scan_all(r#""hello" 'world'"#);
    assert_eq!(
        tokens,
        vec![
            (SyntaxKind::StringLiteral, "hello".to_string()),
            (SyntaxKind::StringLiteral, "world".to_string()),
        ]
    );
}

#[test]
fn test_string_escapes() {
    let tokens = tokenize(r#""a\"b\n""#).unwrap();
    assert_eq!(tokens[0].value, "a\"b\n");
    assert_eq!(tokens[0].text, r#""a\"b\n""#);
}

#[test]
fn test_template_literal() {
    let tokens = scan_all("`Hello ${name}`");
    assert_eq!(
        tokens,
        vec![(SyntaxKind::TemplateLiteral, "Hello ${name}".to_string())]
    );
}

#[test]
fn test_unterminated_template_is_not_fatal() {
    let mut scanner = Scanner::new("`open\n");
    let tokens = scanner.tokenize().unwrap();
    assert_eq!(tokens[0].kind, SyntaxKind::TemplateLiteral);
    let diagnostics = scanner.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.diagnostics()[0].code, 1003);
}

#[test]
fn test_identifiers() {
    let tokens = scan_all("foo _bar baz123");
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|(k, _)| *k == SyntaxKind::Identifier));
}

#[test]
fn test_keywords() {
    assert_eq!(
        scan_kinds("let const var function class async"),
        vec![
            SyntaxKind::LetKeyword,
            SyntaxKind::ConstKeyword,
            SyntaxKind::VarKeyword,
            SyntaxKind::FunctionKeyword,
            SyntaxKind::ClassKeyword,
            SyntaxKind::AsyncKeyword,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    let tokens = scan_all("trueValue nullable");
    assert_eq!(tokens[0].0, SyntaxKind::Identifier);
    assert_eq!(tokens[1].0, SyntaxKind::Identifier);
}

#[test]
fn test_arrow_beats_equals() {
    assert_eq!(
        scan_kinds("() => x"),
        vec![
            SyntaxKind::OpenParenToken,
            SyntaxKind::CloseParenToken,
            SyntaxKind::EqualsGreaterThanToken,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFileToken,
        ]
    );
}

#[test]
fn test_operators() {
    let kinds: Vec<_> = scan_all("+ - * ** / % === !== == != <= >= && || ?? ?. ...")
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::PlusToken,
            SyntaxKind::MinusToken,
            SyntaxKind::AsteriskToken,
            SyntaxKind::AsteriskAsteriskToken,
            SyntaxKind::SlashToken,
            SyntaxKind::PercentToken,
            SyntaxKind::EqualsEqualsEqualsToken,
            SyntaxKind::ExclamationEqualsEqualsToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::LessThanEqualsToken,
            SyntaxKind::GreaterThanEqualsToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::BarBarToken,
            SyntaxKind::QuestionQuestionToken,
            SyntaxKind::QuestionDotToken,
            SyntaxKind::DotDotDotToken,
        ]
    );
}

#[test]
fn test_question_dot_before_digit_is_conditional() {
    let kinds = scan_kinds("a?.5:1");
    assert_eq!(kinds[1], SyntaxKind::QuestionToken);
    assert_eq!(kinds[2], SyntaxKind::NumericLiteral);
}

#[test]
fn test_comments_skipped() {
    let tokens = scan_all("a // comment\nb /* inline */ c");
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_crlf_is_one_line_break() {
    let tokens = tokenize("a\r\nb").unwrap();
    assert_eq!(tokens[1].kind, SyntaxKind::NewLineToken);
    assert_eq!(tokens[1].text, "\r\n");
    assert_eq!(tokens[2].line, 2);
    assert_eq!(tokens[2].column, 1);
    assert_eq!(tokens[2].offset, 3);
}

#[test]
fn test_line_break_flag() {
    let tokens = tokenize("a\n(b)").unwrap();
    let paren = &tokens[2];
    assert_eq!(paren.kind, SyntaxKind::OpenParenToken);
    assert!(paren.preceded_by_line_break);
    assert!(!tokens[3].preceded_by_line_break);
}

#[test]
fn test_invalid_character_is_fatal() {
    let err: TokenizationError = tokenize("$a = 1\n$b = @").unwrap_err();
    assert_eq!(err.ch, '@');
    assert_eq!(err.location.line, 2);
    assert_eq!(err.location.column, 6);
}

#[test]
fn test_type_annotation_tokens() {
    assert_eq!(
        scan_kinds("$name: string = \"x\""),
        vec![
            SyntaxKind::DollarToken,
            SyntaxKind::Identifier,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::StringLiteral,
            SyntaxKind::EndOfFileToken,
        ]
    );
}
