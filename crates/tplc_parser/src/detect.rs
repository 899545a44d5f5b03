//! Syntax-version detection.
//!
//! A cheap pre-pass over raw text that classifies a body as legacy or
//! modern without tokenizing it. Every classifying pattern pairs the `$`
//! sigil with a marker only the modern dialect uses, so a bare `$` (as in
//! `$('#id')`) never makes a file modern. Missing a modern file is
//! acceptable; the parser upgrades the version when it sees a sigil
//! declaration.

use regex::Regex;
use std::sync::OnceLock;
use tplc_ast::types::{ModernFeatures, SyntaxVersion};

/// The result of classifying one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub version: SyntaxVersion,
    pub features: ModernFeatures,
}

struct Patterns {
    /// `$name =`, but not `==` or `=>`.
    assignment: Regex,
    /// `$name!` followed by `:` or whitespace.
    reactive: Regex,
    /// `$name!=` opening a statement; elsewhere it is a comparison.
    reactive_equals: Regex,
    /// `$name: Type =` opening a statement; elsewhere the colon may end a
    /// conditional branch.
    typed: Regex,
    /// `$name = (...) =>`
    arrow: Regex,
    /// `{$name}` in markup.
    template_binding: Regex,
}

impl Patterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            assignment: Regex::new(r"(?:^|[^\w$.])\$[A-Za-z_]\w*\s*=(?:[^=>]|$)")?,
            reactive: Regex::new(r"(?:^|[^\w$.])\$[A-Za-z_]\w*!(?::|\s)")?,
            reactive_equals: Regex::new(r"(?:^|[;{}])\s*\$[A-Za-z_]\w*!=(?:[^=]|$)")?,
            typed: Regex::new(r"(?:^|[;{}])\s*\$[A-Za-z_]\w*\s*:\s*[A-Za-z_][\w<>\[\]?,| ]*\s*=(?:[^=>]|$)")?,
            arrow: Regex::new(r"\$[A-Za-z_]\w*\s*=\s*(?:async\s*)?\([^)]*\)\s*=>")?,
            template_binding: Regex::new(r"\{\s*\$[A-Za-z_]\w*\s*\}")?,
        })
    }
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

fn patterns() -> Option<&'static Patterns> {
    PATTERNS.get_or_init(Patterns::new).as_ref().ok()
}

/// Classify `content` as legacy or modern.
pub fn detect_syntax_version(content: &str) -> SyntaxVersion {
    detect(content).version
}

/// Classify `content` and report which modern features appear in it.
pub fn detect(content: &str) -> Detection {
    let legacy = Detection {
        version: SyntaxVersion::Legacy,
        features: ModernFeatures::empty(),
    };
    if memchr::memchr(b'$', content.as_bytes()).is_none() {
        return legacy;
    }
    let patterns = match patterns() {
        Some(patterns) => patterns,
        None => return legacy,
    };

    let mut features = ModernFeatures::empty();
    if patterns.template_binding.is_match(content) {
        features |= ModernFeatures::TEMPLATE_BINDINGS;
    }

    let code = mask_literals(content);
    let lines: Vec<&str> = code.lines().collect();
    let line_matches = |re: &Regex| {
        lines.iter().enumerate().any(|(i, line)| {
            re.find_iter(line).any(|m| {
                !declared_by_keyword(&line[..m.start()])
                    && !(line[..m.start()].trim().is_empty() && continues_previous(&lines[..i]))
            })
        })
    };

    if line_matches(&patterns.assignment) {
        features |= ModernFeatures::SIGIL_VARIABLES;
    }
    if line_matches(&patterns.reactive) || line_matches(&patterns.reactive_equals) {
        features |= ModernFeatures::SIGIL_VARIABLES | ModernFeatures::REACTIVE_MARKERS;
    }
    if line_matches(&patterns.typed) {
        features |= ModernFeatures::SIGIL_VARIABLES | ModernFeatures::TYPE_ANNOTATIONS;
    }
    if line_matches(&patterns.arrow) {
        features |= ModernFeatures::ARROW_FUNCTIONS;
    }

    let version = if features.contains(ModernFeatures::SIGIL_VARIABLES) {
        SyntaxVersion::Modern
    } else {
        SyntaxVersion::Legacy
    };
    tracing::debug!(%version, features = ?features, "detected syntax version");
    Detection { version, features }
}

/// Whether the text before a match ends with `let`, `const` or `var`:
/// `var $el = ...` is an ordinary legacy declaration.
fn declared_by_keyword(prefix: &str) -> bool {
    let trimmed = prefix.trim_end();
    ["let", "const", "var"].iter().any(|kw| {
        trimmed.ends_with(kw)
            && trimmed[..trimmed.len() - kw.len()]
                .chars()
                .next_back()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '$'))
    })
}

/// Whether the last non-blank line ends in a token that carries the
/// expression onto the next line, as in a conditional split after `?`.
fn continues_previous(previous: &[&str]) -> bool {
    previous
        .iter()
        .rev()
        .map(|line| line.trim_end())
        .find(|line| !line.is_empty())
        .and_then(|line| line.chars().next_back())
        .map_or(false, |last| {
            matches!(
                last,
                '?' | ':' | ',' | '=' | '(' | '[' | '&' | '|' | '+' | '-' | '*' | '/' | '%'
            )
        })
}

/// Replace the contents of string literals and comments with spaces,
/// keeping line breaks so line-anchored patterns still line up.
fn mask_literals(content: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut chars = content.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '\'' | '"' | '`' => {
                    state = State::Quoted(ch);
                    out.push(ch);
                }
                '/' if chars.peek() == Some(&'/') => {
                    state = State::LineComment;
                    out.push(' ');
                }
                '/' if chars.peek() == Some(&'*') => {
                    state = State::BlockComment;
                    out.push(' ');
                }
                _ => out.push(ch),
            },
            State::Quoted(quote) => {
                if ch == '\\' {
                    out.push(' ');
                    if let Some(escaped) = chars.next() {
                        out.push(if escaped == '\n' { '\n' } else { ' ' });
                    }
                } else if ch == quote {
                    state = State::Code;
                    out.push(ch);
                } else if ch == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::LineComment => {
                if ch == '\n' {
                    state = State::Code;
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                    out.push_str("  ");
                } else if ch == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
        }
    }
    out
}
