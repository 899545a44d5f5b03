//! One parse of one template body.

use crate::detect::detect;
use crate::error::FrontendError;
use crate::parser::Parser;
use tplc_ast::node::Program;
use tplc_binder::{Binder, DependencyGraph};
use tplc_checker::{SymbolTable, TypeChecker};
use tplc_diagnostics::DiagnosticCollection;
use tplc_scanner::Scanner;

/// Knobs that change how a parse treats recoverable problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Annotation conflicts stop the parse. When unset they are reported as
    /// warnings and the declaration is kept.
    pub fatal_type_errors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fatal_type_errors: true,
        }
    }
}

/// Everything a successful parse produces.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    /// Advisory diagnostics, sorted by position.
    pub diagnostics: DiagnosticCollection,
    pub dependency_graph: DependencyGraph,
    /// The file's top-level names and their types.
    pub symbols: SymbolTable,
}

/// Owns all per-parse state: the checker with its symbol table and the
/// diagnostic collection. Sessions are independent, so distinct files can be
/// parsed on distinct threads.
pub struct ParserSession<'a> {
    source: &'a str,
    options: ParseOptions,
    checker: TypeChecker,
    diagnostics: DiagnosticCollection,
}

impl<'a> ParserSession<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    pub fn with_options(source: &'a str, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            checker: TypeChecker::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Run detection, scanning, parsing and binding.
    pub fn parse(mut self) -> Result<ParseOutput, FrontendError> {
        let detection = detect(self.source);

        let mut scanner = Scanner::new(self.source);
        let tokens = scanner.tokenize()?;
        self.diagnostics.extend(scanner.take_diagnostics());
        tracing::trace!(tokens = tokens.len(), "scanned body");

        let mut parser = Parser::new(
            self.source,
            tokens,
            &mut self.checker,
            &mut self.diagnostics,
            self.options,
        );
        let body = parser.parse_program()?;
        let syntax_version = detection.version.join(parser.observed_version());
        let modern_feature_flags = detection.features | parser.features();

        let mut program = Program {
            body,
            syntax_version,
            modern_feature_flags,
        };

        let mut binder = Binder::new();
        let dependency_graph = binder.bind_program(&mut program);
        self.diagnostics.extend(binder.take_diagnostics());
        self.diagnostics.sort();

        tracing::debug!(
            version = %program.syntax_version,
            declarations = program.body.len(),
            diagnostics = self.diagnostics.len(),
            "parsed body"
        );

        Ok(ParseOutput {
            program,
            diagnostics: self.diagnostics,
            dependency_graph,
            symbols: self.checker.into_symbols(),
        })
    }
}

/// Parse a body with default options.
pub fn parse(source: &str) -> Result<ParseOutput, FrontendError> {
    ParserSession::new(source).parse()
}

/// Parse a body and return only its tree.
pub fn parse_modern(content: &str) -> Result<Program, FrontendError> {
    parse(content).map(|output| output.program)
}
