//! Expression construction from a collected token span.
//!
//! The expression grammar is deliberately shallow. A span that is a single
//! literal, a single (optionally sigiled) identifier, a bracketed list or a
//! braced list of pairs becomes the matching node. Anything else is kept as
//! a [`CompoundExpression`]: its raw source text plus the operand leaves, which
//! is all that dependency analysis and inference need.

use tplc_ast::node::*;
use tplc_ast::syntax_kind::SyntaxKind;
use tplc_scanner::Token;

/// Whether a token can name a binding after `$`.
pub(crate) fn is_name(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::Identifier || kind.is_keyword()
}

/// Build an expression from a non-empty span of significant tokens.
pub(crate) fn build_expression(tokens: &[Token], source: &str) -> Expression {
    match tokens {
        [single] => {
            if let Some(literal) = literal_from_token(single) {
                return Expression::Literal(literal);
            }
            if single.is(SyntaxKind::Identifier) {
                return Expression::Identifier(plain_identifier(single));
            }
        }
        [dollar, name] if dollar.is(SyntaxKind::DollarToken) && is_name(name.kind) => {
            return Expression::Identifier(sigil_identifier(dollar, name));
        }
        [minus, number] if minus.is(SyntaxKind::MinusToken) && number.is(SyntaxKind::NumericLiteral) => {
            let value = match parse_numeric(&number.value) {
                LiteralValue::Integer(n) => LiteralValue::Integer(-n),
                LiteralValue::Float(n) => LiteralValue::Float(-n),
                other => other,
            };
            return Expression::Literal(Literal {
                value,
                raw: raw_text(tokens, source),
                location: minus.location(),
            });
        }
        _ => {}
    }

    if let Some(first) = tokens.first() {
        let last = tokens.len() - 1;
        if first.is(SyntaxKind::OpenBracketToken) && matching_close(tokens, 0) == Some(last) {
            let elements = split_top_level(&tokens[1..last])
                .into_iter()
                .map(|element| build_expression(element, source))
                .collect();
            return Expression::Array(ArrayLiteral {
                elements,
                location: first.location(),
            });
        }
        if first.is(SyntaxKind::OpenBraceToken) && matching_close(tokens, 0) == Some(last) {
            if let Some(properties) = object_properties(&tokens[1..last], source) {
                return Expression::Object(ObjectLiteral {
                    properties,
                    location: first.location(),
                });
            }
        }
    }

    Expression::Compound(CompoundExpression {
        raw: raw_text(tokens, source),
        operands: collect_operands(tokens),
        location: tokens.first().map(Token::location).unwrap_or_default(),
    })
}

/// Source text covered by `tokens`, exactly as written.
pub(crate) fn raw_text(tokens: &[Token], source: &str) -> String {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => source
            .get(first.offset as usize..last.offset as usize + last.text.len())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

pub(crate) fn literal_from_token(token: &Token) -> Option<Literal> {
    let value = match token.kind {
        SyntaxKind::NumericLiteral => parse_numeric(&token.value),
        SyntaxKind::StringLiteral => LiteralValue::String(token.value.clone()),
        SyntaxKind::TemplateLiteral => LiteralValue::Template(token.value.clone()),
        SyntaxKind::TrueKeyword => LiteralValue::Boolean(true),
        SyntaxKind::FalseKeyword => LiteralValue::Boolean(false),
        SyntaxKind::NullKeyword => LiteralValue::Null,
        _ => return None,
    };
    Some(Literal {
        value,
        raw: token.text.clone(),
        location: token.location(),
    })
}

/// Integers become `Integer` unless they overflow; anything with a
/// fraction or exponent is a `Float`.
fn parse_numeric(text: &str) -> LiteralValue {
    let lower = text.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0b") => Some(2),
        Some("0o") => Some(8),
        _ => None,
    };
    if let Some(radix) = radix {
        return match i64::from_str_radix(&lower[2..], radix) {
            Ok(n) => LiteralValue::Integer(n),
            Err(_) => LiteralValue::Float(f64::NAN),
        };
    }
    if !lower.contains(|c: char| c == '.' || c == 'e') {
        if let Ok(n) = lower.parse::<i64>() {
            return LiteralValue::Integer(n);
        }
    }
    LiteralValue::Float(lower.parse::<f64>().unwrap_or(f64::NAN))
}

fn plain_identifier(token: &Token) -> Identifier {
    Identifier {
        name: token.text.clone(),
        has_sigil: false,
        location: token.location(),
    }
}

fn sigil_identifier(dollar: &Token, name: &Token) -> Identifier {
    Identifier {
        name: name.text.clone(),
        has_sigil: true,
        location: dollar.location(),
    }
}

fn opens(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
    )
}

fn closes(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken | SyntaxKind::CloseBraceToken
    )
}

/// Index of the bracket closing the one at `open`.
pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if opens(token.kind) {
            depth += 1;
        } else if closes(token.kind) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split on commas outside any brackets, dropping empty pieces.
fn split_top_level(tokens: &[Token]) -> Vec<&[Token]> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if opens(token.kind) {
            depth += 1;
        } else if closes(token.kind) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is(SyntaxKind::CommaToken) {
            pieces.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    pieces.push(&tokens[start..]);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

/// `key: value`, `$name` and `name` shorthand. Anything else (methods,
/// spreads, computed keys) makes the whole literal a compound.
fn object_properties(tokens: &[Token], source: &str) -> Option<Vec<ObjectProperty>> {
    split_top_level(tokens)
        .into_iter()
        .map(|piece| match piece {
            [name] if name.is(SyntaxKind::Identifier) => Some(ObjectProperty {
                key: name.text.clone(),
                value: Expression::Identifier(plain_identifier(name)),
            }),
            [dollar, name] if dollar.is(SyntaxKind::DollarToken) && is_name(name.kind) => {
                Some(ObjectProperty {
                    key: name.text.clone(),
                    value: Expression::Identifier(sigil_identifier(dollar, name)),
                })
            }
            [key, colon, value @ ..]
                if colon.is(SyntaxKind::ColonToken)
                    && !value.is_empty()
                    && (is_name(key.kind)
                        || key.is(SyntaxKind::StringLiteral)
                        || key.is(SyntaxKind::NumericLiteral)) =>
            {
                Some(ObjectProperty {
                    key: key.value.clone(),
                    value: build_expression(value, source),
                })
            }
            _ => None,
        })
        .collect()
}

/// The operand leaves of a compound span. Member names after `.` are not operands.
fn collect_operands(tokens: &[Token]) -> Vec<Expression> {
    let mut operands = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let after_member_access = i > 0
            && matches!(
                tokens[i - 1].kind,
                SyntaxKind::DotToken | SyntaxKind::QuestionDotToken
            );
        if token.is(SyntaxKind::DollarToken) {
            if let Some(name) = tokens.get(i + 1).filter(|t| is_name(t.kind)) {
                if !after_member_access {
                    operands.push(Expression::Identifier(sigil_identifier(token, name)));
                }
                i += 2;
                continue;
            }
        } else if token.is(SyntaxKind::Identifier) {
            if !after_member_access {
                operands.push(Expression::Identifier(plain_identifier(token)));
            }
        } else if let Some(literal) = literal_from_token(token) {
            operands.push(Expression::Literal(literal));
        }
        i += 1;
    }
    operands
}

#[cfg(test)]
mod tests {
    use super::*;
    use tplc_scanner::tokenize;

    fn build(source: &str) -> Expression {
        let tokens: Vec<Token> = tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is(SyntaxKind::NewLineToken) && !t.is(SyntaxKind::EndOfFileToken))
            .collect();
        build_expression(&tokens, source)
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(parse_numeric("42"), LiteralValue::Integer(42));
        assert_eq!(parse_numeric("0xff"), LiteralValue::Integer(255));
        assert_eq!(parse_numeric("1e3"), LiteralValue::Float(1000.0));
        assert_eq!(parse_numeric("19.99"), LiteralValue::Float(19.99));
    }

    #[test]
    fn test_negative_literal() {
        match build("-5") {
            Expression::Literal(lit) => {
                assert_eq!(lit.value, LiteralValue::Integer(-5));
                assert_eq!(lit.raw, "-5");
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_skips_member_names() {
        match build("$user.name + other.$x + 1") {
            Expression::Compound(c) => {
                assert_eq!(c.raw, "$user.name + other.$x + 1");
                let names: Vec<_> = c
                    .operands
                    .iter()
                    .filter_map(|e| match e {
                        Expression::Identifier(i) => Some(i.name.as_str()),
                        _ => None,
                    })
                    .collect();
                assert_eq!(names, vec!["user", "other"]);
                assert_eq!(c.operands.len(), 3);
            }
            other => panic!("expected compound, got {:?}", other),
        }
    }

    #[test]
    fn test_object_with_method_falls_back_to_compound() {
        assert!(matches!(build("{ run() {} }"), Expression::Compound(_)));
        assert!(matches!(build("{ a: 1, $b }"), Expression::Object(_)));
    }
}
