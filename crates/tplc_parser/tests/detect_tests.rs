//! Syntax-version detector tests.
//!
//! Every classifying pattern must pair the sigil with a modern-only
//! marker; the rest of these cases are legacy code that must stay legacy.

use tplc_ast::types::{ModernFeatures, SyntaxVersion};
use tplc_parser::{detect, detect_syntax_version};

fn is_modern(source: &str) -> bool {
    detect_syntax_version(source) == SyntaxVersion::Modern
}

// ============================================================================
// Modern markers
// ============================================================================

#[test]
fn test_reactive_marker() {
    let detection = detect("$count! = 0\n");
    assert_eq!(detection.version, SyntaxVersion::Modern);
    assert!(detection
        .features
        .contains(ModernFeatures::SIGIL_VARIABLES | ModernFeatures::REACTIVE_MARKERS));
}

#[test]
fn test_reactive_marker_without_spaces() {
    assert!(is_modern("$open!=true"));
    assert!(is_modern("a = 1; $b!=2"));
    assert!(is_modern("  $ready!=false\n"));
}

#[test]
fn test_typed_declaration() {
    let detection = detect("$name: string = \"test\"\n  $total: Array<number> = []\n");
    assert_eq!(detection.version, SyntaxVersion::Modern);
    assert!(detection.features.contains(ModernFeatures::TYPE_ANNOTATIONS));
}

#[test]
fn test_arrow_function() {
    let detection = detect("$greet = (name) => \"Hi \" + name");
    assert_eq!(detection.version, SyntaxVersion::Modern);
    assert!(detection.features.contains(ModernFeatures::ARROW_FUNCTIONS));
}

#[test]
fn test_plain_sigil_assignment() {
    let detection = detect("$x = 1");
    assert_eq!(detection.version, SyntaxVersion::Modern);
    assert_eq!(detection.features, ModernFeatures::SIGIL_VARIABLES);
}

#[test]
fn test_template_binding_sets_flag_only() {
    let detection = detect("<p>{$name}</p>\n");
    assert_eq!(detection.version, SyntaxVersion::Legacy);
    assert!(detection.features.contains(ModernFeatures::TEMPLATE_BINDINGS));
}

// ============================================================================
// Legacy code that must not classify
// ============================================================================

#[test]
fn test_no_sigil_is_legacy() {
    let detection = detect("var x = { a: 1 };\nfunction f() { return x }\n");
    assert_eq!(detection.version, SyntaxVersion::Legacy);
    assert!(detection.features.is_empty());
}

#[test]
fn test_comparison_is_not_assignment() {
    assert!(!is_modern("if ($a == b) { go() }"));
    assert!(!is_modern("if ($a === b) { go() }"));
}

#[test]
fn test_jquery_call_is_legacy() {
    let detection = detect("$('#x').hide();\n$(document).ready(init);\n");
    assert_eq!(detection.version, SyntaxVersion::Legacy);
    assert!(detection.features.is_empty());
}

#[test]
fn test_markers_in_strings_and_comments_are_ignored() {
    assert!(!is_modern("log(\"$x = 1\");\n"));
    assert!(!is_modern("log('$ready! = true');\n"));
    assert!(!is_modern("// $x = 1\n/* $y! = 2\n   $z: number = 3 */\nrun();\n"));
}

#[test]
fn test_keyword_declared_sigil_name_is_legacy() {
    assert!(!is_modern("var $el = $('#app');\n"));
    assert!(!is_modern("const $items = [];\nlet $count = 0;\n"));
}

#[test]
fn test_inequality_inside_condition_is_legacy() {
    assert!(!is_modern("if ($count!=0) { render() }\n"));
    assert!(!is_modern("while (ok && $n!=limit) step()\n"));
}

#[test]
fn test_conditional_branch_is_not_an_annotation() {
    assert!(!is_modern("x = a ? $b: c = 1"));
    assert!(!is_modern("x = a ?\n  $b: c = 1"));
}
