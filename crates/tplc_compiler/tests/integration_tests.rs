//! Compiler integration tests.
//!
//! End-to-end tests for the compilation pipeline: header -> parse -> bind,
//! including option handling and parallel compilation.

use tplc_compiler::{compile_file, CompileError, HeaderError, Program};
use tplc_options::{CompilerOptions, TypeErrors};
use tplc_parser::FrontendError;

fn compile(text: &str) -> Result<tplc_compiler::CompiledFile, CompileError> {
    compile_file("test.tpl", text, &CompilerOptions::default())
}

// ============================================================================
// Headers
// ============================================================================

#[test]
fn test_compile_without_header() {
    let file = compile("$count! = 0").unwrap();
    assert!(file.header.is_none());
    assert_eq!(file.program.body.len(), 1);
}

#[test]
fn test_compile_with_header() {
    let text = "---\ntype: page\ntitle: \"Home\"\ntags: [a, b]\n---\n$count! = 0\n";
    let file = compile(text).unwrap();
    let header = file.header.unwrap();
    assert_eq!(header["type"], "page");
    assert_eq!(header["title"], "Home");
    assert_eq!(header["tags"][1], "b");
    assert_eq!(file.program.body.len(), 1);
}

#[test]
fn test_missing_discriminator() {
    match compile("---\ntitle: Home\n---\n$a = 1") {
        Err(CompileError::Header {
            source: HeaderError::MissingDiscriminator(field),
            ..
        }) => assert_eq!(field, "type"),
        other => panic!("expected header error, got {:?}", other),
    }
}

#[test]
fn test_discriminator_must_be_a_string() {
    assert!(compile("---\ntype: 3\n---\n").is_err());
}

#[test]
fn test_custom_discriminator() {
    let options = CompilerOptions {
        discriminator: "kind".to_string(),
        ..CompilerOptions::default()
    };
    assert!(compile_file("a.tpl", "---\nkind: widget\n---\n", &options).is_ok());
    assert!(compile_file("a.tpl", "---\ntype: widget\n---\n", &options).is_err());
}

#[test]
fn test_unclosed_header() {
    assert!(matches!(
        compile("---\ntype: page\n$a = 1"),
        Err(CompileError::Header {
            source: HeaderError::Unclosed,
            ..
        })
    ));
}

#[test]
fn test_malformed_header_line() {
    match compile("---\ntype: page\nnot a pair\n---\n") {
        Err(CompileError::Header {
            source: HeaderError::MalformedLine { line, .. },
            ..
        }) => assert_eq!(line, 3),
        other => panic!("expected malformed line, got {:?}", other),
    }
}

#[test]
fn test_require_header() {
    let options = CompilerOptions {
        require_header: true,
        ..CompilerOptions::default()
    };
    assert!(matches!(
        compile_file("a.tpl", "$a = 1", &options),
        Err(CompileError::Header {
            source: HeaderError::Missing,
            ..
        })
    ));
}

// ============================================================================
// Locations
// ============================================================================

#[test]
fn test_diagnostics_use_file_lines() {
    let file = compile("---\ntype: page\n---\n$x = 1\n(console)").unwrap();
    let diagnostic = &file.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.code, 1201);
    assert_eq!(diagnostic.location.line, 5);
    assert_eq!(diagnostic.file.as_deref(), Some("test.tpl"));
}

#[test]
fn test_errors_use_file_lines() {
    match compile("---\ntype: page\n---\n\n$x = 1 @") {
        Err(CompileError::Frontend {
            source: FrontendError::Tokenization(err),
            ..
        }) => {
            assert_eq!(err.location.line, 5);
            assert_eq!(err.location.column, 8);
        }
        other => panic!("expected tokenization error, got {:?}", other),
    }
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_type_errors_as_warnings() {
    let options = CompilerOptions {
        type_errors: TypeErrors::Warning,
        ..CompilerOptions::default()
    };
    let file = compile_file("a.tpl", "$price: string = 19.99", &options).unwrap();
    assert_eq!(file.diagnostics.len(), 1);
    assert_eq!(file.diagnostics.diagnostics()[0].code, 2001);

    assert!(matches!(
        compile("$price: string = 19.99"),
        Err(CompileError::Frontend {
            source: FrontendError::TypeValidation(_),
            ..
        })
    ));
}

#[test]
fn test_strict_rejects_diagnostics() {
    let options = CompilerOptions {
        strict: true,
        ..CompilerOptions::default()
    };
    match compile_file("a.tpl", "$x = 1\n(console)", &options) {
        Err(CompileError::Strict { diagnostics, path }) => {
            assert_eq!(path, "a.tpl");
            assert_eq!(diagnostics.len(), 1);
        }
        other => panic!("expected strict failure, got {:?}", other),
    }
    assert!(compile_file("a.tpl", "$x = 1;\n(console)", &options).is_ok());
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn test_program_keeps_input_order() {
    let mut program = Program::new(vec![], CompilerOptions::default());
    for i in 0..32 {
        program.add_source(format!("file{}.tpl", i), format!("$value{}! = {}", i, i));
    }
    program.add_source("broken.tpl", "$ = 1");

    let results = program.compile();
    assert_eq!(results.len(), 33);
    for (i, result) in results.iter().take(32).enumerate() {
        let file = result.as_ref().unwrap();
        assert_eq!(file.path, format!("file{}.tpl", i));
        assert_eq!(file.program.body[0].name(), format!("value{}", i));
    }
    assert_eq!(results[32].as_ref().unwrap_err().path(), "broken.tpl");
}

#[test]
fn test_load_missing_root_file() {
    let mut program = Program::new(
        vec!["/nonexistent/file.tpl".to_string()],
        CompilerOptions::default(),
    );
    assert!(matches!(
        program.load_root_files(),
        Err(CompileError::Io { .. })
    ));
}

#[test]
fn test_same_source_compiles_identically() {
    let text = "---\ntype: page\n---\n$a! = 1\n$b! = $a * 2\n";
    let first = compile(text).unwrap();
    let second = compile(text).unwrap();
    assert_eq!(first.program, second.program);
    assert_eq!(first.dependency_graph, second.dependency_graph);
}
