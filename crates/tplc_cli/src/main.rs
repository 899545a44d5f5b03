//! tplc: The template compiler CLI.
//!
//! Usage:
//!   tplc [options] [file...]
//!
//! Exit codes: 0 success, 1 usage or I/O error, 2 compilation errors.

use clap::{Parser as ClapParser, ValueEnum};
use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report, Severity};
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use std::time::Instant;
use tplc_compiler::{split_header, CompileError, CompiledFile, Program, SourceFile};
use tplc_diagnostics::{Diagnostic, DiagnosticCategory};
use tplc_options::{CompilerOptions, TypeErrors, CONFIG_FILE_NAME};

#[derive(ClapParser, Debug)]
#[command(name = "tplc", version, about = "tplc - a compiler frontend for the template language")]
struct Cli {
    /// Template files to compile.
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Path to tplc.json.
    #[arg(short = 'p', long = "project")]
    project: Option<String>,

    /// Fail on any advisory diagnostic.
    #[arg(long)]
    strict: bool,

    /// Treat annotation conflicts as errors or warnings.
    #[arg(long = "type-errors", value_enum)]
    type_errors: Option<TypeErrorsArg>,

    /// Print each file's syntax tree as JSON.
    #[arg(long)]
    ast: bool,

    /// Print only the detected syntax version of each file.
    #[arg(long)]
    detect: bool,

    /// Enable debug logging.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeErrorsArg {
    Error,
    Warning,
}

impl From<TypeErrorsArg> for TypeErrors {
    fn from(arg: TypeErrorsArg) -> Self {
        match arg {
            TypeErrorsArg::Error => TypeErrors::Error,
            TypeErrorsArg::Warning => TypeErrors::Warning,
        }
    }
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    process::exit(run(&cli));
}

/// Log to stderr, filtered by `TPLC_LOG` (default `warn`).
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TPLC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> i32 {
    let start = Instant::now();

    let mut options = match load_options(cli) {
        Ok(options) => options,
        Err(message) => {
            print_error(&message);
            return 1;
        }
    };

    // CLI options override tplc.json
    if cli.strict {
        options.strict = true;
    }
    if let Some(arg) = cli.type_errors {
        options.type_errors = arg.into();
    }

    let files = if cli.files.is_empty() {
        options.files.clone()
    } else {
        cli.files.clone()
    };
    if files.is_empty() {
        print_error("No input files found.");
        return 1;
    }

    let mut program = Program::new(files, options);
    if let Err(e) = program.load_root_files() {
        print_error(&e.to_string());
        return 1;
    }

    if cli.detect {
        for file in program.source_files() {
            let body = split_header(&file.text).map_or(file.text.as_str(), |parts| parts.body);
            println!("{}: {}", file.path, tplc_parser::detect_syntax_version(body));
        }
        return 0;
    }

    let results = program.compile();
    let mut failed = 0usize;
    for (file, result) in program.source_files().iter().zip(results) {
        match result {
            Ok(compiled) => {
                for diagnostic in compiled.diagnostics.iter() {
                    render(file, diagnostic_report(file, diagnostic));
                }
                if cli.ast {
                    print_ast(&compiled);
                }
            }
            Err(err) => {
                failed += 1;
                report_error(file, err);
            }
        }
    }

    let use_color = std::io::stderr().is_terminal();
    let elapsed = start.elapsed().as_secs_f64();
    if failed > 0 {
        let plural = if failed == 1 { "" } else { "s" };
        if use_color {
            eprintln!("\n{}{}Found {} failing file{}.{}", BOLD, RED, failed, plural, RESET);
        } else {
            eprintln!("\nFound {} failing file{}.", failed, plural);
        }
        return 2;
    }

    if use_color {
        eprintln!("{}Compiled {} file(s){} {}in {:.2}s.{}", GREEN, program.source_files().len(), RESET, GRAY, elapsed, RESET);
    } else {
        eprintln!("Compiled {} file(s) in {:.2}s.", program.source_files().len(), elapsed);
    }
    0
}

/// `-p` wins; otherwise `tplc.json` in the working directory when present.
fn load_options(cli: &Cli) -> Result<CompilerOptions, String> {
    let path = match cli.project {
        Some(ref project) => project.as_str(),
        None if Path::new(CONFIG_FILE_NAME).exists() => CONFIG_FILE_NAME,
        None => return Ok(CompilerOptions::default()),
    };
    tracing::debug!(path, "loading configuration");
    tplc_options::parse_config_file(path).map_err(|e| e.to_string())
}

fn print_ast(compiled: &CompiledFile) {
    match serde_json::to_string_pretty(&compiled.program) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("{}: cannot serialize syntax tree: {}", compiled.path, e)),
    }
}

fn report_error(file: &SourceFile, err: CompileError) {
    match err {
        CompileError::Frontend { ref source, .. } => {
            let location = source.location();
            let diagnostic = MietteDiagnostic::new(source.to_string())
                .with_severity(Severity::Error)
                .with_label(label(file, location.index, source.length(), "here"));
            render(file, diagnostic);
        }
        CompileError::Strict { diagnostics, .. } => {
            for diagnostic in diagnostics.iter() {
                render(file, diagnostic_report(file, diagnostic).with_severity(Severity::Error));
            }
            print_error(&format!("{}: strict mode rejects advisory diagnostics", file.path));
        }
        other => print_error(&other.to_string()),
    }
}

fn diagnostic_report(file: &SourceFile, diagnostic: &Diagnostic) -> MietteDiagnostic {
    let severity = match diagnostic.category {
        DiagnosticCategory::Error => Severity::Error,
        DiagnosticCategory::Warning => Severity::Warning,
        DiagnosticCategory::Suggestion | DiagnosticCategory::Message => Severity::Advice,
    };
    let report = MietteDiagnostic::new(diagnostic.message_text.clone())
        .with_code(format!("TPL{}", diagnostic.code))
        .with_severity(severity)
        .with_label(label(
            file,
            diagnostic.location.index,
            diagnostic.length,
            &diagnostic.category.to_string(),
        ));
    match diagnostic.suggestion {
        Some(ref help) => report.with_help(help.clone()),
        None => report,
    }
}

fn label(file: &SourceFile, index: u32, length: u32, text: &str) -> LabeledSpan {
    LabeledSpan::at(span(index, length, file.text.len()), text.to_string())
}

/// A byte range clamped to the file.
fn span(index: u32, length: u32, text_len: usize) -> std::ops::Range<usize> {
    let start = (index as usize).min(text_len);
    let end = (start + length as usize).min(text_len);
    start..end
}

fn render(file: &SourceFile, diagnostic: MietteDiagnostic) {
    let report = Report::new(diagnostic)
        .with_source_code(NamedSource::new(file.path.clone(), file.text.clone()));
    eprintln!("{:?}", report);
}

fn print_error(msg: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}
