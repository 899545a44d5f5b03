//! Automatic statement termination.
//!
//! Decides where a statement ends when no `;` is written, and flags the
//! line-break patterns where a reader could take the next line either as a
//! new statement or as a continuation of the previous one. The decision is a
//! pure function of the token stream.

use tplc_ast::syntax_kind::SyntaxKind;
use tplc_core::text::SourceLocation;
use tplc_diagnostics::{messages, Diagnostic};
use tplc_scanner::Token;

/// The kind of statement that was just parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Variable,
    Function,
    Expression,
    Return,
    Throw,
    Break,
    Continue,
    Class,
}

impl StatementKind {
    /// Whether a terminator may be synthesized after this statement.
    pub fn is_terminable(self) -> bool {
        !matches!(self, StatementKind::Class)
    }
}

/// The token position right after a statement.
#[derive(Debug, Clone, Copy)]
pub struct AsiContext<'a> {
    pub tokens: &'a [Token],
    /// Index of the first token after the statement.
    pub position: usize,
    pub statement: StatementKind,
}

impl<'a> AsiContext<'a> {
    pub fn new(tokens: &'a [Token], position: usize, statement: StatementKind) -> Self {
        Self {
            tokens,
            position,
            statement,
        }
    }

    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    /// The last significant token before the position.
    fn previous(&self) -> Option<&'a Token> {
        self.tokens[..self.position.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| !t.is(SyntaxKind::NewLineToken))
    }

    /// The first significant token at or after the position.
    fn next_significant(&self) -> Option<&'a Token> {
        self.tokens
            .iter()
            .skip(self.position)
            .find(|t| !t.is(SyntaxKind::NewLineToken))
    }
}

/// Which rule ended the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationRule {
    EndOfInput,
    LineBreak,
    RestrictedToken,
    CloseBrace,
}

/// The outcome of a termination decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A `;` was written.
    Explicit,
    /// A terminator is implied by the given rule.
    Synthesized(TerminationRule),
    /// The statement does not end here.
    Continue,
}

/// Decide how the statement ending at `ctx.position` terminates.
pub fn decide(ctx: &AsiContext<'_>) -> Termination {
    let current = match ctx.current() {
        Some(token) => token,
        None => return Termination::Synthesized(TerminationRule::EndOfInput),
    };
    if current.is(SyntaxKind::SemicolonToken) {
        return Termination::Explicit;
    }
    if !ctx.statement.is_terminable() {
        return Termination::Continue;
    }
    let rule = match current.kind {
        SyntaxKind::EndOfFileToken => TerminationRule::EndOfInput,
        SyntaxKind::NewLineToken => TerminationRule::LineBreak,
        kind if kind.is_restricted() && current.preceded_by_line_break => {
            TerminationRule::RestrictedToken
        }
        SyntaxKind::CloseBraceToken => TerminationRule::CloseBrace,
        _ => return Termination::Continue,
    };
    Termination::Synthesized(rule)
}

/// Whether the statement ending at `ctx.position` terminates there.
pub fn should_terminate(ctx: &AsiContext<'_>) -> bool {
    decide(ctx) != Termination::Continue
}

/// The two classic terminator-omission traps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityKind {
    /// The next line opens with `(`, `[` or a template literal.
    StatementContinuation,
    /// The next line opens with a binary operator.
    BinaryOperatorContinuation,
}

/// A flagged line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub kind: AmbiguityKind,
    /// Location of the token opening the second line.
    pub location: SourceLocation,
    /// The opening token as it would be written, e.g. `(` or `` ` ``.
    pub token: String,
    /// Line of the statement that may be continued.
    pub previous_line: u32,
    pub suggestion: String,
}

impl Ambiguity {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let line = self.location.line.to_string();
        let previous = self.previous_line.to_string();
        let message = match self.kind {
            AmbiguityKind::StatementContinuation => &messages::STATEMENT_CONTINUATION,
            AmbiguityKind::BinaryOperatorContinuation => &messages::BINARY_OPERATOR_CONTINUATION,
        };
        Diagnostic::new(self.location, message, &[&line, &self.token, &previous])
            .with_length(self.token.len() as u32)
            .with_suggestion(self.suggestion.clone())
    }
}

/// Flag a line ending in an identifier or literal that is followed by a line
/// opening with `(`, `[`, a template literal or a binary operator.
pub fn detect_ambiguity(ctx: &AsiContext<'_>) -> Option<Ambiguity> {
    if ctx.current()?.is(SyntaxKind::SemicolonToken) {
        return None;
    }
    let previous = ctx.previous()?;
    if !(previous.is(SyntaxKind::Identifier) || previous.kind.is_literal()) {
        return None;
    }
    let next = ctx.next_significant()?;
    if !next.preceded_by_line_break {
        return None;
    }

    let (kind, token, suggestion) = if next.kind.is_restricted() {
        let token = if next.is(SyntaxKind::TemplateLiteral) {
            "`".to_string()
        } else {
            next.text.clone()
        };
        let suggestion = format!("add an explicit ';' at the end of line {}", previous.line);
        (AmbiguityKind::StatementContinuation, token, suggestion)
    } else if next.kind.is_binary_operator() {
        let suggestion = format!(
            "join line {} onto line {} if the operator continues the expression",
            next.line, previous.line
        );
        (AmbiguityKind::BinaryOperatorContinuation, next.text.clone(), suggestion)
    } else {
        return None;
    };

    Some(Ambiguity {
        kind,
        location: next.location(),
        token,
        previous_line: previous.line,
        suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tplc_scanner::tokenize;

    fn position_of(tokens: &[Token], text: &str) -> usize {
        tokens.iter().position(|t| t.text == text).unwrap()
    }

    #[test]
    fn test_explicit_semicolon_short_circuits() {
        let tokens = tokenize("$x = 1;\n(a)").unwrap();
        let ctx = AsiContext::new(&tokens, position_of(&tokens, ";"), StatementKind::Variable);
        assert_eq!(decide(&ctx), Termination::Explicit);
        assert!(detect_ambiguity(&ctx).is_none());
    }

    #[test]
    fn test_class_is_not_terminable() {
        let tokens = tokenize("a\nb").unwrap();
        let ctx = AsiContext::new(&tokens, 1, StatementKind::Class);
        assert!(!should_terminate(&ctx));
    }
}
