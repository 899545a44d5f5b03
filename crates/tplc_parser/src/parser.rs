//! The template-language parser.
//!
//! A recursive descent parser over the full token list. It keeps a single
//! cursor with `peek`/`advance`/`check`/`consume` primitives, consults the
//! statement-termination engine after every statement, and runs type
//! inference and annotation validation as each declaration is built.

use crate::asi::{self, AsiContext, StatementKind, Termination};
use crate::error::{FrontendError, ParseError};
use crate::expression::{build_expression, is_name, matching_close};
use crate::session::ParseOptions;
use indexmap::IndexMap;
use tplc_ast::node::*;
use tplc_ast::syntax_kind::SyntaxKind;
use tplc_ast::types::{BaseType, ModernFeatures, SyntaxVersion, TypeInfo};
use tplc_binder::{analyze_dependencies, analyze_update_triggers};
use tplc_checker::{annotation, TypeChecker};
use tplc_core::text::SourceLocation;
use tplc_diagnostics::{DiagnosticCategory, DiagnosticCollection};
use tplc_scanner::Token;

/// Maximum nesting of blocks, classes and types.
const MAX_RECURSION_DEPTH: u32 = 200;

type ParseResult<T> = Result<T, FrontendError>;

/// Where a binding appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingContext {
    Statement,
    ClassMember,
}

/// A parsed `name = ...` binding before it is placed in the tree.
enum Binding {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
}

/// The parser produces the declarations of one template body.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    checker: &'a mut TypeChecker,
    diagnostics: &'a mut DiagnosticCollection,
    options: ParseOptions,
    features: ModernFeatures,
    saw_sigil_declaration: bool,
    recursion_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(
        source: &'a str,
        mut tokens: Vec<Token>,
        checker: &'a mut TypeChecker,
        diagnostics: &'a mut DiagnosticCollection,
        options: ParseOptions,
    ) -> Self {
        if !tokens.last().map_or(false, |t| t.is(SyntaxKind::EndOfFileToken)) {
            let end = source.len() as u32;
            tokens.push(Token {
                kind: SyntaxKind::EndOfFileToken,
                text: String::new(),
                value: String::new(),
                line: source.lines().count().max(1) as u32,
                column: 1,
                offset: end,
                preceded_by_line_break: false,
            });
        }
        Self {
            source,
            tokens,
            pos: 0,
            checker,
            diagnostics,
            options,
            features: ModernFeatures::empty(),
            saw_sigil_declaration: false,
            recursion_depth: 0,
        }
    }

    /// The modern features seen while parsing.
    pub fn features(&self) -> ModernFeatures {
        self.features
    }

    /// `Modern` once any sigil declaration has been parsed.
    pub fn observed_version(&self) -> SyntaxVersion {
        if self.saw_sigil_declaration {
            SyntaxVersion::Modern
        } else {
            SyntaxVersion::Legacy
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    fn kind(&self) -> SyntaxKind {
        self.current().kind
    }

    /// Kind of the token `offset` places ahead, line breaks included.
    fn peek_kind(&self, offset: usize) -> SyntaxKind {
        self.kind_at(self.pos + offset)
    }

    fn kind_at(&self, index: usize) -> SyntaxKind {
        self.tokens
            .get(index)
            .map_or(SyntaxKind::EndOfFileToken, |t| t.kind)
    }

    /// Index of the first significant token at or after `index`.
    fn significant_from(&self, index: usize) -> usize {
        let mut i = index;
        while self.kind_at(i) == SyntaxKind::NewLineToken {
            i += 1;
        }
        i
    }

    /// Kind of the `n`th significant token after the current one.
    fn peek_significant(&self, n: usize) -> SyntaxKind {
        let mut i = self.pos;
        for _ in 0..n {
            i = self.significant_from(i + 1);
        }
        self.kind_at(i)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    #[inline]
    fn check(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: SyntaxKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn consume_name(&mut self, message: &str) -> ParseResult<Token> {
        if is_name(self.kind()) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(SyntaxKind::NewLineToken) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while self.check(SyntaxKind::NewLineToken) || self.check(SyntaxKind::SemicolonToken) {
            self.advance();
        }
    }

    fn error(&self, message: &str) -> FrontendError {
        let token = self.current();
        let actual = match token.kind {
            SyntaxKind::EndOfFileToken | SyntaxKind::NewLineToken => token.kind.describe().to_string(),
            _ => format!("'{}'", token.text),
        };
        ParseError {
            location: token.location(),
            message: message.to_string(),
            actual,
        }
        .into()
    }

    fn enter(&mut self) -> ParseResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.recursion_depth -= 1;
    }

    // ========================================================================
    // Program
    // ========================================================================

    /// Parse every top-level declaration.
    ///
    /// A `$` only starts a declaration when followed by a name and a
    /// declaration marker; other `$` statements are parsed as expressions
    /// and dropped. Tokens that cannot start a declaration are skipped.
    pub fn parse_program(&mut self) -> ParseResult<Vec<Declaration>> {
        let mut body = Vec::new();
        loop {
            self.skip_separators();
            let decl = match self.kind() {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::DollarToken if self.is_declaration_start() => {
                    let binding = self.parse_binding(true, false, BindingContext::Statement)?;
                    self.declaration_from(binding)
                }
                SyntaxKind::DollarToken => {
                    self.parse_expression()?;
                    self.terminate_statement(StatementKind::Expression);
                    continue;
                }
                SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword | SyntaxKind::VarKeyword => {
                    self.parse_legacy_variable()?
                }
                SyntaxKind::FunctionKeyword => self.parse_legacy_function()?,
                SyntaxKind::AsyncKeyword if self.peek_significant(1) == SyntaxKind::FunctionKeyword => {
                    self.parse_legacy_function()?
                }
                SyntaxKind::ClassKeyword => Declaration::Class(self.parse_class()?),
                _ => {
                    tracing::trace!(token = %self.current().text, "skipping unsupported statement token");
                    self.advance();
                    continue;
                }
            };
            self.register(&decl);
            self.terminate_statement(statement_kind(&decl));
            body.push(decl);
        }
        Ok(body)
    }

    /// At a `$`: is this a declaration (`$name =`, `$name!`, `$name:`,
    /// `$name(...) {`) rather than an expression?
    ///
    /// `$name!=` and `$name:` also read as a comparison (`$a!=0`) and a
    /// conditional branch (`c ? $a: b`), so they only declare at the start
    /// of a statement.
    fn is_declaration_start(&self) -> bool {
        let next = self.peek_kind(1);
        if !is_name(next) {
            // `$ = ...` is a malformed declaration, reported by the parser.
            return match next {
                SyntaxKind::EqualsToken | SyntaxKind::ExclamationToken => true,
                SyntaxKind::ExclamationEqualsToken | SyntaxKind::ColonToken => {
                    self.at_statement_start()
                }
                _ => false,
            };
        }
        match self.peek_kind(2) {
            SyntaxKind::EqualsToken | SyntaxKind::ExclamationToken => true,
            SyntaxKind::ExclamationEqualsToken | SyntaxKind::ColonToken => {
                self.at_statement_start()
            }
            SyntaxKind::OpenParenToken => self.is_method_shorthand_at(self.pos + 2),
            _ => false,
        }
    }

    /// Whether the current token begins a statement: it opens the input,
    /// follows `;`, `{` or `}`, or follows a line break after a token that
    /// does not continue onto the next line.
    fn at_statement_start(&self) -> bool {
        let mut i = self.pos;
        let mut line_break = self.current().preceded_by_line_break;
        while i > 0 && self.kind_at(i - 1) == SyntaxKind::NewLineToken {
            line_break = true;
            i -= 1;
        }
        if i == 0 {
            return true;
        }
        match self.kind_at(i - 1) {
            SyntaxKind::SemicolonToken | SyntaxKind::OpenBraceToken | SyntaxKind::CloseBraceToken => true,
            previous => line_break && !previous.expects_continuation(),
        }
    }

    /// `(params)` at `open` followed by a block or a return annotation.
    fn is_method_shorthand_at(&self, open: usize) -> bool {
        let close = match matching_close(&self.tokens, open) {
            Some(close) => close,
            None => return false,
        };
        matches!(
            self.kind_at(self.significant_from(close + 1)),
            SyntaxKind::OpenBraceToken | SyntaxKind::ColonToken
        )
    }

    /// After `=`: does an arrow function start at `index`?
    fn is_arrow_function_at(&self, index: usize) -> bool {
        let mut i = self.significant_from(index);
        if self.kind_at(i) == SyntaxKind::AsyncKeyword {
            i = self.significant_from(i + 1);
        }
        match self.kind_at(i) {
            SyntaxKind::Identifier => {
                self.kind_at(self.significant_from(i + 1)) == SyntaxKind::EqualsGreaterThanToken
            }
            SyntaxKind::OpenParenToken => {
                let close = match matching_close(&self.tokens, i) {
                    Some(close) => close,
                    None => return false,
                };
                let after = self.significant_from(close + 1);
                match self.kind_at(after) {
                    SyntaxKind::EqualsGreaterThanToken => true,
                    SyntaxKind::ColonToken => self.arrow_follows_return_type(after + 1),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Scan a return annotation for the `=>` that ends it, on the same line.
    fn arrow_follows_return_type(&self, start: usize) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens[start.min(self.tokens.len())..] {
            match token.kind {
                SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::OpenBraceToken => depth += 1,
                SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                SyntaxKind::EqualsGreaterThanToken if depth == 0 => return true,
                SyntaxKind::NewLineToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::EndOfFileToken
                    if depth == 0 =>
                {
                    return false
                }
                SyntaxKind::EndOfFileToken => return false,
                _ => {}
            }
        }
        false
    }

    /// Apply statement termination after a statement ending at the cursor.
    fn terminate_statement(&mut self, kind: StatementKind) {
        let ctx = AsiContext::new(&self.tokens, self.pos, kind);
        let decision = asi::decide(&ctx);
        if let Some(ambiguity) = asi::detect_ambiguity(&ctx) {
            tracing::debug!(
                line = ambiguity.location.line,
                kind = ?ambiguity.kind,
                "ambiguous line break"
            );
            self.diagnostics.add(ambiguity.to_diagnostic());
        }
        match decision {
            Termination::Explicit => {
                self.advance();
            }
            Termination::Synthesized(rule) => {
                tracing::trace!(?rule, line = self.current().line, "synthesized terminator");
                if self.saw_sigil_declaration {
                    self.features |= ModernFeatures::OMITTED_TERMINATORS;
                }
            }
            Termination::Continue => {}
        }
    }

    /// Record a declaration's type in the file's symbol table.
    fn register(&mut self, decl: &Declaration) {
        let ty = match decl {
            Declaration::Variable(v) => declared_type(v),
            Declaration::ReactiveVariable(r) => declared_type(&r.declaration),
            Declaration::Function(f) => function_type(f),
            Declaration::Class(_) => TypeInfo::new(BaseType::Object),
        };
        self.checker.register_variable(decl.name(), ty);
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Parse `[$]name[!][: T] = value`, `[$]name = (params) => body` or
    /// `[$]name(params) { ... }`.
    fn parse_binding(
        &mut self,
        has_sigil: bool,
        is_async: bool,
        context: BindingContext,
    ) -> ParseResult<Binding> {
        let location = self.current().location();
        if has_sigil {
            self.consume(SyntaxKind::DollarToken, "Expected '$'")?;
        }
        let name = self
            .consume_name(if has_sigil {
                "Expected identifier after '$'"
            } else {
                "Expected member name"
            })?
            .text;
        if has_sigil {
            self.saw_sigil_declaration = true;
            self.features |= ModernFeatures::SIGIL_VARIABLES;
        }

        if self.check(SyntaxKind::OpenParenToken) {
            let parameters = self.parse_parameter_list(false)?;
            let return_annotation = if self.eat(SyntaxKind::ColonToken) {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.skip_newlines();
            let body = self.parse_block_body()?;
            let func = self.finish_function(
                name,
                parameters,
                return_annotation,
                body,
                is_async,
                has_sigil,
                location,
            );
            return Ok(Binding::Function(func));
        }

        // `$name!=` scans as one token; split it back into marker and `=`.
        let mut has_marker = false;
        let mut equals_seen = false;
        match self.kind() {
            SyntaxKind::ExclamationToken => {
                self.advance();
                has_marker = has_sigil;
            }
            SyntaxKind::ExclamationEqualsToken => {
                self.advance();
                has_marker = has_sigil;
                equals_seen = true;
            }
            _ => {}
        }
        if has_marker {
            self.features |= ModernFeatures::REACTIVE_MARKERS;
        }

        let annotation = if !equals_seen && self.eat(SyntaxKind::ColonToken) {
            if has_sigil {
                self.features |= ModernFeatures::TYPE_ANNOTATIONS;
            }
            Some(self.parse_type()?)
        } else {
            None
        };

        let keyword = if has_sigil {
            DeclarationKeyword::Sigil
        } else {
            DeclarationKeyword::Member
        };

        if !equals_seen {
            if context == BindingContext::ClassMember && !self.check(SyntaxKind::EqualsToken) {
                let variable =
                    self.make_variable(name, keyword, has_marker, annotation, None, location)?;
                return Ok(Binding::Variable(variable));
            }
            self.consume(SyntaxKind::EqualsToken, "Expected '=' in declaration")?;
        }

        if self.is_arrow_function_at(self.pos) {
            if has_sigil {
                self.features |= ModernFeatures::ARROW_FUNCTIONS;
            }
            let func = self.parse_arrow_function(name, annotation, has_sigil, location)?;
            return Ok(Binding::Function(func));
        }

        let initializer = self.parse_expression()?;
        let variable =
            self.make_variable(name, keyword, has_marker, annotation, Some(initializer), location)?;
        Ok(Binding::Variable(variable))
    }

    fn declaration_from(&self, binding: Binding) -> Declaration {
        match binding {
            Binding::Function(func) => Declaration::Function(func),
            Binding::Variable(variable) if variable.has_reactive_marker => {
                let (dependencies, update_triggers) = reactive_analysis(&variable);
                Declaration::ReactiveVariable(ReactiveVariableDeclaration {
                    declaration: variable,
                    update_triggers,
                    dependencies,
                })
            }
            Binding::Variable(variable) => Declaration::Variable(variable),
        }
    }

    /// Infer the variable's type and validate its annotation.
    fn make_variable(
        &mut self,
        name: String,
        keyword: DeclarationKeyword,
        has_reactive_marker: bool,
        type_annotation: Option<TypeInfo>,
        initializer: Option<Expression>,
        location: SourceLocation,
    ) -> ParseResult<VariableDeclaration> {
        let inferred_type = self.checker.infer_initializer(initializer.as_ref());
        if let Some(ref annotation) = type_annotation {
            self.validate(&name, annotation, &inferred_type, location)?;
        }
        Ok(VariableDeclaration {
            name,
            keyword,
            has_reactive_marker,
            type_annotation,
            initializer,
            inferred_type,
            location,
        })
    }

    /// Check an annotation; a conflict is fatal or a warning depending on options.
    fn validate(
        &mut self,
        name: &str,
        annotation: &TypeInfo,
        inferred: &TypeInfo,
        location: SourceLocation,
    ) -> ParseResult<()> {
        match self.checker.check_annotation(name, annotation, inferred, location) {
            Ok(()) => Ok(()),
            Err(err) if self.options.fatal_type_errors => Err(err.into()),
            Err(err) => {
                tracing::warn!(name, annotation = %err.annotation, inferred = %err.inferred, "type conflict downgraded to warning");
                self.diagnostics
                    .add(err.to_diagnostic().with_category(DiagnosticCategory::Warning));
                Ok(())
            }
        }
    }

    /// `let|const|var name[: T] [= value]`
    fn parse_legacy_variable(&mut self) -> ParseResult<Declaration> {
        let location = self.current().location();
        let keyword = match self.advance().kind {
            SyntaxKind::LetKeyword => DeclarationKeyword::Let,
            SyntaxKind::ConstKeyword => DeclarationKeyword::Const,
            _ => DeclarationKeyword::Var,
        };
        // `var $el = ...` names the variable `el`.
        self.eat(SyntaxKind::DollarToken);
        let name = self.consume_name("Expected variable name")?.text;
        let annotation = if self.eat(SyntaxKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        if !self.eat(SyntaxKind::EqualsToken) {
            let variable = self.make_variable(name, keyword, false, annotation, None, location)?;
            return Ok(Declaration::Variable(variable));
        }
        if self.is_arrow_function_at(self.pos) {
            let func = self.parse_arrow_function(name, annotation, false, location)?;
            return Ok(Declaration::Function(func));
        }
        let initializer = self.parse_expression()?;
        let variable =
            self.make_variable(name, keyword, false, annotation, Some(initializer), location)?;
        Ok(Declaration::Variable(variable))
    }

    /// `[async] function name(params)[: T] { ... }`
    fn parse_legacy_function(&mut self) -> ParseResult<Declaration> {
        let location = self.current().location();
        let is_async = self.eat(SyntaxKind::AsyncKeyword);
        self.skip_newlines();
        self.consume(SyntaxKind::FunctionKeyword, "Expected 'function'")?;
        let name = self.consume_name("Expected function name")?.text;
        let parameters = self.parse_parameter_list(false)?;
        let return_annotation = if self.eat(SyntaxKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.skip_newlines();
        let body = self.parse_block_body()?;
        Ok(Declaration::Function(self.finish_function(
            name,
            parameters,
            return_annotation,
            body,
            is_async,
            false,
            location,
        )))
    }

    /// `[async] (params)[: T] => body` or `[async] param => body`.
    fn parse_arrow_function(
        &mut self,
        name: String,
        annotation: Option<TypeInfo>,
        auto_bind_self: bool,
        location: SourceLocation,
    ) -> ParseResult<FunctionDeclaration> {
        self.skip_newlines();
        let is_async = self.eat(SyntaxKind::AsyncKeyword);
        let mut parameters = if self.check(SyntaxKind::Identifier) {
            let token = self.advance();
            vec![Parameter {
                name: token.text.clone(),
                has_sigil: false,
                type_annotation: None,
                default_value: None,
                inferred_type: TypeInfo::any(),
                accessibility: None,
                is_readonly: false,
                is_rest: false,
                location: token.location(),
            }]
        } else {
            self.parse_parameter_list(false)?
        };
        let mut return_annotation = if self.eat(SyntaxKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.consume(SyntaxKind::EqualsGreaterThanToken, "Expected '=>'")?;
        let body = self.parse_function_body()?;

        // A function-typed annotation on the binding types the parameters
        // and the return value it does not spell out itself.
        if let Some(ref declared) = annotation {
            if declared.base_type == BaseType::Function {
                for (param, ty) in parameters.iter_mut().zip(&declared.parameters) {
                    if param.type_annotation.is_none() && param.default_value.is_none() {
                        param.inferred_type = ty.clone();
                    }
                }
                if return_annotation.is_none() {
                    return_annotation = declared.return_type.as_deref().cloned();
                }
            }
        }

        let func = self.finish_function(
            name,
            parameters,
            return_annotation,
            body,
            is_async,
            auto_bind_self,
            location,
        );
        if let Some(ref declared) = annotation {
            self.validate(&func.name, declared, &function_type(&func), location)?;
        }
        Ok(func)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_function(
        &mut self,
        name: String,
        parameters: Vec<Parameter>,
        return_type_annotation: Option<TypeInfo>,
        body: FunctionBody,
        is_async: bool,
        auto_bind_self: bool,
        location: SourceLocation,
    ) -> FunctionDeclaration {
        let return_type = return_type_annotation
            .clone()
            .unwrap_or_else(|| TypeChecker::default_return_type(is_async));
        FunctionDeclaration {
            name,
            parameters,
            return_type_annotation,
            return_type,
            body,
            is_async,
            auto_bind_self,
            location,
        }
    }

    /// `( [param {, param}] [,] )`
    fn parse_parameter_list(&mut self, allow_modifiers: bool) -> ParseResult<Vec<Parameter>> {
        self.consume(SyntaxKind::OpenParenToken, "Expected '('")?;
        let mut parameters = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(SyntaxKind::CloseParenToken) {
                break;
            }
            parameters.push(self.parse_parameter(allow_modifiers)?);
            self.skip_newlines();
            if self.eat(SyntaxKind::CommaToken) {
                continue;
            }
            self.consume(
                SyntaxKind::CloseParenToken,
                "Expected ',' or ')' in parameter list",
            )?;
            break;
        }
        Ok(parameters)
    }

    /// `[modifiers] [...] [$]name[?][: T][= default]`
    fn parse_parameter(&mut self, allow_modifiers: bool) -> ParseResult<Parameter> {
        let location = self.current().location();
        let mut accessibility = None;
        let mut is_readonly = false;
        while self.kind().is_accessibility_modifier() && is_name(self.peek_significant(1)) {
            if !allow_modifiers {
                return Err(self.error("Access modifiers are only allowed on constructor parameters"));
            }
            match self.advance().kind {
                SyntaxKind::PublicKeyword => accessibility = Some(Accessibility::Public),
                SyntaxKind::PrivateKeyword => accessibility = Some(Accessibility::Private),
                SyntaxKind::ProtectedKeyword => accessibility = Some(Accessibility::Protected),
                _ => is_readonly = true,
            }
        }
        let is_rest = self.eat(SyntaxKind::DotDotDotToken);
        let has_sigil = self.eat(SyntaxKind::DollarToken);
        let name = self.consume_name("Expected parameter name")?.text;
        let optional = self.eat(SyntaxKind::QuestionToken);
        let type_annotation = if self.eat(SyntaxKind::ColonToken) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let default_value = if self.eat(SyntaxKind::EqualsToken) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        if let (Some(annotation), Some(default)) = (&type_annotation, &default_value) {
            let default_type = self.checker.infer_type(default);
            self.validate(&name, annotation, &default_type, location)?;
        }
        let mut inferred_type = self
            .checker
            .infer_parameter(type_annotation.as_ref(), default_value.as_ref());
        if is_rest && type_annotation.is_none() {
            inferred_type = TypeInfo::array_of(TypeInfo::any());
        }
        if optional {
            inferred_type.nullable = true;
        }

        Ok(Parameter {
            name,
            has_sigil,
            type_annotation,
            default_value,
            inferred_type,
            accessibility,
            is_readonly,
            is_rest,
            location,
        })
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// `class Name [heritage] { members }`
    fn parse_class(&mut self) -> ParseResult<ClassDeclaration> {
        self.enter()?;
        let location = self.current().location();
        self.consume(SyntaxKind::ClassKeyword, "Expected 'class'")?;
        let name = self.consume_name("Expected class name")?.text;
        // Heritage clauses are not modelled.
        while !self.check(SyntaxKind::OpenBraceToken) {
            if self.check(SyntaxKind::EndOfFileToken) {
                return Err(self.error("Expected '{' to open class body"));
            }
            self.advance();
        }
        self.advance();

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        let mut constructor: Option<ConstructorDeclaration> = None;
        loop {
            self.skip_separators();
            match self.kind() {
                SyntaxKind::CloseBraceToken => {
                    self.advance();
                    break;
                }
                SyntaxKind::EndOfFileToken => {
                    return Err(self.error("Expected '}' to close class body"));
                }
                SyntaxKind::Identifier
                    if self.current().text == "constructor"
                        && self.peek_significant(1) == SyntaxKind::OpenParenToken =>
                {
                    if constructor.is_some() {
                        return Err(self.error("A class may only have one constructor"));
                    }
                    let ctor = self.parse_constructor()?;
                    properties.extend(
                        ctor.parameters
                            .iter()
                            .filter(|p| p.auto_assign())
                            .map(parameter_property),
                    );
                    constructor = Some(ctor);
                }
                SyntaxKind::AsyncKeyword | SyntaxKind::DollarToken | SyntaxKind::Identifier => {
                    let is_async = self.eat(SyntaxKind::AsyncKeyword);
                    let has_sigil = self.check(SyntaxKind::DollarToken);
                    if has_sigil {
                        self.features |= ModernFeatures::CLASS_MEMBERS;
                    }
                    let binding =
                        self.parse_binding(has_sigil, is_async, BindingContext::ClassMember)?;
                    let kind = match binding {
                        Binding::Function(func) => {
                            methods.push(func);
                            StatementKind::Function
                        }
                        Binding::Variable(variable) => {
                            let (dependencies, update_triggers) = if variable.has_reactive_marker {
                                reactive_analysis(&variable)
                            } else {
                                (Vec::new(), Vec::new())
                            };
                            properties.push(PropertyDeclaration {
                                variable,
                                from_constructor: false,
                                update_triggers,
                                dependencies,
                            });
                            StatementKind::Variable
                        }
                    };
                    self.terminate_statement(kind);
                }
                _ => return Err(self.error("Unexpected token in class body")),
            }
        }
        self.leave();

        Ok(ClassDeclaration {
            name,
            properties,
            methods,
            constructor,
            location,
        })
    }

    fn parse_constructor(&mut self) -> ParseResult<ConstructorDeclaration> {
        let location = self.current().location();
        self.advance();
        self.skip_newlines();
        let parameters = self.parse_parameter_list(true)?;
        self.skip_newlines();
        let body = self.parse_block_body()?;
        Ok(ConstructorDeclaration {
            parameters,
            body,
            location,
        })
    }

    // ========================================================================
    // Bodies and statements
    // ========================================================================

    /// A block, or a single expression wrapped as an implicit return.
    fn parse_function_body(&mut self) -> ParseResult<FunctionBody> {
        self.skip_newlines();
        if self.check(SyntaxKind::OpenBraceToken) {
            return self.parse_block_body();
        }
        let location = self.current().location();
        let expression = self.parse_expression()?;
        Ok(FunctionBody {
            statements: vec![Statement::Return(ReturnStatement {
                argument: Some(expression),
                location,
            })],
            implicit_return: true,
            location,
        })
    }

    /// `{ statements }`
    fn parse_block_body(&mut self) -> ParseResult<FunctionBody> {
        self.enter()?;
        let location = self.current().location();
        self.consume(SyntaxKind::OpenBraceToken, "Expected '{'")?;
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            match self.kind() {
                SyntaxKind::CloseBraceToken => {
                    self.advance();
                    break;
                }
                SyntaxKind::EndOfFileToken => return Err(self.error("Expected '}'")),
                _ => {
                    let saved = self.pos;
                    if let Some(statement) = self.parse_statement()? {
                        statements.push(statement);
                    }
                    if self.pos == saved {
                        self.advance();
                    }
                }
            }
        }
        self.leave();
        Ok(FunctionBody {
            statements,
            implicit_return: false,
            location,
        })
    }

    /// One statement inside a block. Stray closers yield `None`.
    fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        let location = self.current().location();
        let (statement, kind) = match self.kind() {
            SyntaxKind::DollarToken if self.is_declaration_start() => {
                let binding = self.parse_binding(true, false, BindingContext::Statement)?;
                let decl = self.declaration_from(binding);
                let kind = statement_kind(&decl);
                (Statement::Declaration(decl), kind)
            }
            SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword | SyntaxKind::VarKeyword => {
                let decl = self.parse_legacy_variable()?;
                (Statement::Declaration(decl), StatementKind::Variable)
            }
            SyntaxKind::FunctionKeyword => {
                let decl = self.parse_legacy_function()?;
                (Statement::Declaration(decl), StatementKind::Function)
            }
            SyntaxKind::AsyncKeyword if self.peek_significant(1) == SyntaxKind::FunctionKeyword => {
                let decl = self.parse_legacy_function()?;
                (Statement::Declaration(decl), StatementKind::Function)
            }
            SyntaxKind::ClassKeyword => {
                let decl = Declaration::Class(self.parse_class()?);
                (Statement::Declaration(decl), StatementKind::Class)
            }
            SyntaxKind::ReturnKeyword => {
                self.advance();
                let argument = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                (
                    Statement::Return(ReturnStatement { argument, location }),
                    StatementKind::Return,
                )
            }
            SyntaxKind::ThrowKeyword => {
                self.advance();
                let argument = self.parse_expression()?;
                (
                    Statement::Throw(ThrowStatement { argument, location }),
                    StatementKind::Throw,
                )
            }
            SyntaxKind::BreakKeyword => {
                self.advance();
                (Statement::Break(JumpStatement { location }), StatementKind::Break)
            }
            SyntaxKind::ContinueKeyword => {
                self.advance();
                (
                    Statement::Continue(JumpStatement { location }),
                    StatementKind::Continue,
                )
            }
            _ => match self.parse_expression_opt()? {
                Some(expression) => (
                    Statement::Expression(ExpressionStatement {
                        expression,
                        location,
                    }),
                    StatementKind::Expression,
                ),
                None => return Ok(None),
            },
        };
        self.terminate_statement(kind);
        Ok(Some(statement))
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.kind(),
            SyntaxKind::NewLineToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        )
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        match self.parse_expression_opt()? {
            Some(expression) => Ok(expression),
            None => Err(self.error("Expected expression")),
        }
    }

    /// Collect the tokens of one expression and build it.
    ///
    /// The expression ends at `;`, `,` or an unmatched closer, or at a line
    /// break unless the line ends with a token that needs an operand or the
    /// next line opens with `.` or `?.`.
    fn parse_expression_opt(&mut self) -> ParseResult<Option<Expression>> {
        self.skip_newlines();
        let mut collected: Vec<Token> = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.kind() {
                SyntaxKind::EndOfFileToken => {
                    if depth > 0 {
                        return Err(self.error("Unclosed bracket in expression"));
                    }
                    break;
                }
                SyntaxKind::SemicolonToken | SyntaxKind::CommaToken if depth == 0 => break,
                SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::OpenBraceToken => depth += 1,
                SyntaxKind::NewLineToken => {
                    let continues = depth > 0
                        || collected
                            .last()
                            .map_or(true, |t| t.kind.expects_continuation())
                        || self.next_line_continues();
                    if !continues {
                        break;
                    }
                    self.advance();
                    continue;
                }
                _ => {}
            }
            collected.push(self.advance());
        }
        if collected.is_empty() {
            return Ok(None);
        }
        Ok(Some(build_expression(&collected, self.source)))
    }

    /// Whether the line after the current line break opens with `.` or `?.`.
    fn next_line_continues(&self) -> bool {
        matches!(
            self.kind_at(self.significant_from(self.pos)),
            SyntaxKind::DotToken | SyntaxKind::QuestionDotToken
        )
    }

    // ========================================================================
    // Type annotations
    // ========================================================================

    /// `member { | member }`. `null`, `undefined` and `void` members make
    /// the rest nullable; differing members collapse to `any`.
    fn parse_type(&mut self) -> ParseResult<TypeInfo> {
        self.enter()?;
        let mut nullable = false;
        let mut members = Vec::new();
        loop {
            let is_null = self.check(SyntaxKind::NullKeyword)
                || (self.check(SyntaxKind::Identifier)
                    && matches!(self.current().text.as_str(), "undefined" | "void"));
            let member = self.parse_postfix_type()?;
            if is_null {
                nullable = true;
            } else {
                members.push(member);
            }
            if !self.eat(SyntaxKind::BarToken) {
                break;
            }
        }
        self.leave();

        let mut members = members.into_iter();
        let ty = match members.next() {
            None => return Ok(TypeInfo::any()),
            Some(first) => {
                if members.all(|m| m.base_type == first.base_type) {
                    first
                } else {
                    TypeInfo::any()
                }
            }
        };
        Ok(if nullable { ty.with_nullable(true) } else { ty })
    }

    /// `primary { [] | ? }`
    fn parse_postfix_type(&mut self) -> ParseResult<TypeInfo> {
        let mut ty = self.parse_primary_type()?;
        loop {
            if self.check(SyntaxKind::OpenBracketToken)
                && self.peek_kind(1) == SyntaxKind::CloseBracketToken
            {
                self.advance();
                self.advance();
                ty = TypeInfo::array_of(ty);
            } else if self.eat(SyntaxKind::QuestionToken) {
                ty.nullable = true;
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeInfo> {
        match self.kind() {
            SyntaxKind::OpenParenToken => {
                let is_function = matching_close(&self.tokens, self.pos).map_or(false, |close| {
                    self.kind_at(self.significant_from(close + 1))
                        == SyntaxKind::EqualsGreaterThanToken
                });
                if is_function {
                    let parameters = self.parse_parameter_list(false)?;
                    self.consume(SyntaxKind::EqualsGreaterThanToken, "Expected '=>'")?;
                    let return_type = self.parse_type()?;
                    let parameter_types = parameters.into_iter().map(|p| p.inferred_type).collect();
                    return Ok(TypeInfo::function(parameter_types, return_type));
                }
                self.advance();
                let ty = self.parse_type()?;
                self.consume(SyntaxKind::CloseParenToken, "Expected ')' in type")?;
                Ok(ty)
            }
            SyntaxKind::OpenBraceToken => self.parse_object_type(),
            SyntaxKind::StringLiteral | SyntaxKind::TemplateLiteral => {
                self.advance();
                Ok(TypeInfo::string())
            }
            SyntaxKind::NumericLiteral => {
                let token = self.advance();
                Ok(if token.value.contains('.') {
                    TypeInfo::float()
                } else {
                    TypeInfo::number()
                })
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                self.advance();
                Ok(TypeInfo::boolean())
            }
            SyntaxKind::NullKeyword => {
                self.advance();
                Ok(TypeInfo::any())
            }
            kind if is_name(kind) => {
                let name = self.advance().text;
                let mut arguments = Vec::new();
                if self.eat(SyntaxKind::LessThanToken) {
                    loop {
                        arguments.push(self.parse_type()?);
                        if !self.eat(SyntaxKind::CommaToken) {
                            break;
                        }
                    }
                    self.consume(SyntaxKind::GreaterThanToken, "Expected '>'")?;
                }
                Ok(annotation::named_type(&name, arguments))
            }
            _ => Err(self.error("Expected type")),
        }
    }

    /// `{ key[?]: T (, | ;) ... }`
    fn parse_object_type(&mut self) -> ParseResult<TypeInfo> {
        self.consume(SyntaxKind::OpenBraceToken, "Expected '{'")?;
        let mut properties = IndexMap::new();
        loop {
            self.skip_newlines();
            if self.eat(SyntaxKind::CloseBraceToken) {
                break;
            }
            let key = if self.check(SyntaxKind::StringLiteral) {
                self.advance().value
            } else {
                self.consume_name("Expected property name in object type")?.text
            };
            let optional = self.eat(SyntaxKind::QuestionToken);
            self.consume(SyntaxKind::ColonToken, "Expected ':' in object type")?;
            let mut ty = self.parse_type()?;
            if optional {
                ty.nullable = true;
            }
            properties.insert(key, ty);
            let separated = self.eat(SyntaxKind::CommaToken) || self.eat(SyntaxKind::SemicolonToken);
            self.skip_newlines();
            if !separated && !self.check(SyntaxKind::CloseBraceToken) {
                // A line break also separates members.
                if self.tokens[self.pos - 1].kind != SyntaxKind::NewLineToken {
                    return Err(self.error("Expected ',' or '}' in object type"));
                }
            }
        }
        Ok(TypeInfo::object_with(properties))
    }
}

fn statement_kind(decl: &Declaration) -> StatementKind {
    match decl {
        Declaration::Variable(_) | Declaration::ReactiveVariable(_) => StatementKind::Variable,
        Declaration::Function(_) => StatementKind::Function,
        Declaration::Class(_) => StatementKind::Class,
    }
}

/// The type a name is registered under: the annotation when present.
fn declared_type(variable: &VariableDeclaration) -> TypeInfo {
    variable
        .type_annotation
        .clone()
        .unwrap_or_else(|| variable.inferred_type.clone())
}

fn function_type(func: &FunctionDeclaration) -> TypeInfo {
    TypeInfo::function(
        func.parameters.iter().map(|p| p.inferred_type.clone()).collect(),
        func.return_type.clone(),
    )
}

/// The property implied by an access-modified constructor parameter.
fn parameter_property(param: &Parameter) -> PropertyDeclaration {
    PropertyDeclaration {
        variable: VariableDeclaration {
            name: param.name.clone(),
            keyword: if param.has_sigil {
                DeclarationKeyword::Sigil
            } else {
                DeclarationKeyword::Member
            },
            has_reactive_marker: false,
            type_annotation: param.type_annotation.clone(),
            initializer: param.default_value.clone(),
            inferred_type: param.inferred_type.clone(),
            location: param.location,
        },
        from_constructor: true,
        update_triggers: Vec::new(),
        dependencies: Vec::new(),
    }
}

/// Dependencies and update triggers of a marked variable, in that order.
fn reactive_analysis(variable: &VariableDeclaration) -> (Vec<String>, Vec<String>) {
    let dependencies = variable
        .initializer
        .as_ref()
        .map(analyze_dependencies)
        .unwrap_or_default();
    let update_triggers = analyze_update_triggers(&variable.name, variable.initializer.as_ref());
    (dependencies, update_triggers)
}
