//! tplc_compiler: Compiler orchestration.
//!
//! Splits each file into header and body, validates the header, parses the
//! body and applies the configured strictness. Files are compiled in
//! parallel, one independent parser session per file.

pub mod header;

use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;
use tplc_binder::DependencyGraph;
use tplc_diagnostics::DiagnosticCollection;
use tplc_options::CompilerOptions;
use tplc_parser::{FrontendError, ParseOptions, ParserSession};

pub use header::{split_header, validate_header, HeaderError, SourceParts};

/// Why a file failed to compile.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Header {
        path: String,
        #[source]
        source: HeaderError,
    },
    /// Locations are relative to the whole file, header included.
    #[error("{path}: {source}")]
    Frontend {
        path: String,
        #[source]
        source: FrontendError,
    },
    #[error("{path}: strict mode rejects {} diagnostic(s)", diagnostics.len())]
    Strict {
        path: String,
        diagnostics: DiagnosticCollection,
    },
}

impl CompileError {
    pub fn path(&self) -> &str {
        match self {
            CompileError::Io { path, .. }
            | CompileError::Header { path, .. }
            | CompileError::Frontend { path, .. }
            | CompileError::Strict { path, .. } => path,
        }
    }
}

/// One successfully compiled file.
#[derive(Debug, Clone)]
pub struct CompiledFile {
    pub path: String,
    pub header: Option<Value>,
    /// Node locations are relative to the body.
    pub program: tplc_ast::Program,
    /// Advisory diagnostics, located in the whole file.
    pub diagnostics: DiagnosticCollection,
    pub dependency_graph: DependencyGraph,
}

/// An input file already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

/// The program represents the entire compilation unit.
pub struct Program {
    /// Compiler options.
    pub options: CompilerOptions,
    /// The root file names.
    pub root_files: Vec<String>,
    source_files: Vec<SourceFile>,
}

impl Program {
    /// Create a new program from root files and options.
    pub fn new(root_files: Vec<String>, options: CompilerOptions) -> Self {
        Self {
            options,
            root_files,
            source_files: Vec::new(),
        }
    }

    /// Add a source file to the program.
    pub fn add_source(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.source_files.push(SourceFile {
            path: path.into(),
            text: text.into(),
        });
    }

    /// Load all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), CompileError> {
        for path in &self.root_files {
            let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
                path: path.clone(),
                source,
            })?;
            self.source_files.push(SourceFile {
                path: path.clone(),
                text,
            });
        }
        Ok(())
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    /// Compile every file in parallel. Results are in input order.
    pub fn compile(&self) -> Vec<Result<CompiledFile, CompileError>> {
        tracing::debug!(files = self.source_files.len(), "compiling program");
        self.source_files
            .par_iter()
            .map(|file| compile_file(&file.path, &file.text, &self.options))
            .collect()
    }
}

/// Compile one file's full text.
pub fn compile_file(
    path: &str,
    text: &str,
    options: &CompilerOptions,
) -> Result<CompiledFile, CompileError> {
    let header_error = |source| CompileError::Header {
        path: path.to_string(),
        source,
    };

    let parts = split_header(text).map_err(header_error)?;
    match parts.header {
        Some(ref header) => validate_header(header, &options.discriminator).map_err(header_error)?,
        None if options.require_header => return Err(header_error(HeaderError::Missing)),
        None => {}
    }

    let parse_options = ParseOptions {
        fatal_type_errors: options.fatal_type_errors(),
    };
    let output = ParserSession::with_options(parts.body, parse_options)
        .parse()
        .map_err(|source| CompileError::Frontend {
            path: path.to_string(),
            source: source.shifted(parts.body_line_offset, parts.body_byte_offset),
        })?;

    let mut diagnostics = output.diagnostics;
    for diagnostic in diagnostics.iter_mut() {
        diagnostic.location = diagnostic
            .location
            .shifted(parts.body_line_offset, parts.body_byte_offset);
        diagnostic.file = Some(path.to_string());
    }

    tracing::debug!(
        path,
        version = %output.program.syntax_version,
        diagnostics = diagnostics.len(),
        "compiled file"
    );

    if options.strict && !diagnostics.is_empty() {
        return Err(CompileError::Strict {
            path: path.to_string(),
            diagnostics,
        });
    }

    Ok(CompiledFile {
        path: path.to_string(),
        header: parts.header,
        program: output.program,
        diagnostics,
        dependency_graph: output.dependency_graph,
    })
}
