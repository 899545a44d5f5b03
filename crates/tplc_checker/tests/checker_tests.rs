//! Checker integration tests.
//!
//! Exercises inference, the symbol table and annotation validation.

use indexmap::IndexMap;
use tplc_ast::node::*;
use tplc_ast::types::{BaseType, TypeInfo};
use tplc_checker::annotation::named_type;
use tplc_checker::TypeChecker;
use tplc_core::text::SourceLocation;

fn loc() -> SourceLocation {
    SourceLocation::start()
}

fn literal(value: LiteralValue, raw: &str) -> Expression {
    Expression::Literal(Literal {
        value,
        raw: raw.to_string(),
        location: loc(),
    })
}

fn ident(name: &str) -> Expression {
    Expression::Identifier(Identifier {
        name: name.to_string(),
        has_sigil: true,
        location: loc(),
    })
}

fn infer(expr: &Expression) -> TypeInfo {
    TypeChecker::new().infer_type(expr)
}

// ============================================================================
// Literal inference
// ============================================================================

#[test]
fn test_infer_literals() {
    assert_eq!(
        infer(&literal(LiteralValue::String("a".into()), "\"a\"")).base_type,
        BaseType::String
    );
    assert_eq!(infer(&literal(LiteralValue::Integer(0), "0")).base_type, BaseType::Number);
    assert_eq!(
        infer(&literal(LiteralValue::Float(19.99), "19.99")).base_type,
        BaseType::Float
    );
    assert_eq!(
        infer(&literal(LiteralValue::Boolean(true), "true")).base_type,
        BaseType::Boolean
    );
    assert_eq!(
        infer(&literal(LiteralValue::Template("hi".into()), "`hi`")).base_type,
        BaseType::String
    );
}

#[test]
fn test_null_is_nullable_any() {
    let ty = infer(&literal(LiteralValue::Null, "null"));
    assert!(ty.is_any());
    assert!(ty.nullable);
}

#[test]
fn test_missing_initializer_is_nullable_any() {
    let ty = TypeChecker::new().infer_initializer(None);
    assert_eq!(ty, TypeInfo::any());
}

#[test]
fn test_compound_is_any() {
    let expr = Expression::Compound(CompoundExpression {
        raw: "$width * $height".into(),
        operands: vec![ident("width"), ident("height")],
        location: loc(),
    });
    assert!(infer(&expr).is_any());
}

#[test]
fn test_mixed_array_elements_are_any() {
    let expr = Expression::Array(ArrayLiteral {
        elements: vec![
            literal(LiteralValue::Integer(1), "1"),
            literal(LiteralValue::String("x".into()), "'x'"),
        ],
        location: loc(),
    });
    let ty = infer(&expr);
    assert_eq!(ty.base_type, BaseType::Array);
    assert!(ty.generic[0].is_any());
}

#[test]
fn test_object_properties() {
    let expr = Expression::Object(ObjectLiteral {
        properties: vec![
            ObjectProperty {
                key: "name".into(),
                value: literal(LiteralValue::String("a".into()), "'a'"),
            },
            ObjectProperty {
                key: "age".into(),
                value: literal(LiteralValue::Integer(3), "3"),
            },
        ],
        location: loc(),
    });
    let ty = infer(&expr);
    assert_eq!(ty.base_type, BaseType::Object);
    assert_eq!(ty.properties["name"], TypeInfo::string());
    assert_eq!(ty.properties["age"], TypeInfo::number());
}

// ============================================================================
// Symbol table
// ============================================================================

#[test]
fn test_identifier_resolves_through_symbols() {
    let mut checker = TypeChecker::new();
    assert!(checker.infer_type(&ident("count")).is_any());

    checker.register_variable("count", TypeInfo::number());
    assert_eq!(checker.lookup("count"), Some(&TypeInfo::number()));
    assert_eq!(checker.infer_type(&ident("count")), TypeInfo::number());
    assert_eq!(checker.symbols().len(), 1);
}

#[test]
fn test_fresh_checker_has_empty_table() {
    let mut first = TypeChecker::new();
    first.register_variable("x", TypeInfo::string());
    let second = TypeChecker::new();
    assert!(second.lookup("x").is_none());
}

// ============================================================================
// Parameters and returns
// ============================================================================

#[test]
fn test_parameter_inference() {
    let checker = TypeChecker::new();
    assert_eq!(checker.infer_parameter(None, None), TypeInfo::any());

    let default = literal(LiteralValue::String("x".into()), "'x'");
    assert_eq!(checker.infer_parameter(None, Some(&default)), TypeInfo::string());

    let annotation = TypeInfo::boolean();
    assert_eq!(
        checker.infer_parameter(Some(&annotation), Some(&default)),
        TypeInfo::boolean()
    );
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_matching_annotation_is_valid() {
    let checker = TypeChecker::new();
    let result = checker.validate_annotation(&TypeInfo::string(), &TypeInfo::string(), "name");
    assert!(result.is_valid);
    assert!(result.conflicts.is_empty());
}

#[test]
fn test_string_vs_float_conflicts() {
    let checker = TypeChecker::new();
    let result = checker.validate_annotation(&TypeInfo::string(), &TypeInfo::float(), "price");
    assert!(!result.is_valid);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].path, "price");

    let err = checker
        .check_annotation("price", &TypeInfo::string(), &TypeInfo::float(), loc())
        .unwrap_err();
    assert_eq!(err.name, "price");
    assert_eq!(err.annotation.base_type, BaseType::String);
    assert_eq!(err.inferred.base_type, BaseType::Float);
    assert!(err.to_string().contains("'string'"));
    assert!(err.to_string().contains("'float'"));
}

#[test]
fn test_number_and_float_are_distinct_kinds() {
    let checker = TypeChecker::new();
    assert!(!checker
        .validate_annotation(&TypeInfo::number(), &TypeInfo::float(), "ratio")
        .is_valid);
}

#[test]
fn test_any_never_conflicts() {
    let checker = TypeChecker::new();
    assert!(checker.validate_annotation(&TypeInfo::any(), &TypeInfo::float(), "a").is_valid);
    assert!(checker.validate_annotation(&TypeInfo::string(), &TypeInfo::any(), "b").is_valid);
}

#[test]
fn test_nested_element_conflict() {
    let checker = TypeChecker::new();
    let annotation = TypeInfo::array_of(TypeInfo::number());
    let inferred = TypeInfo::array_of(TypeInfo::string());
    let result = checker.validate_annotation(&annotation, &inferred, "items");
    assert!(!result.is_valid);
    assert_eq!(result.conflicts[0].path, "items[]");
}

#[test]
fn test_nested_property_conflict() {
    let checker = TypeChecker::new();
    let mut expected = IndexMap::new();
    expected.insert("name".to_string(), TypeInfo::string());
    let mut actual = IndexMap::new();
    actual.insert("name".to_string(), TypeInfo::boolean());
    let result = checker.validate_annotation(
        &TypeInfo::object_with(expected),
        &TypeInfo::object_with(actual),
        "user",
    );
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].path, "user.name");
}

#[test]
fn test_named_object_accepts_object_literal() {
    let checker = TypeChecker::new();
    let annotation = named_type("User", vec![]);
    let inferred = TypeInfo::object_with(IndexMap::new());
    assert!(checker.validate_annotation(&annotation, &inferred, "user").is_valid);
}

#[test]
fn test_conflict_as_diagnostic() {
    let checker = TypeChecker::new();
    let err = checker
        .check_annotation("price", &TypeInfo::string(), &TypeInfo::float(), loc())
        .unwrap_err();
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code, 2001);
    assert_eq!(
        diagnostic.message_text,
        "Type annotation 'string' of 'price' conflicts with inferred type 'float'."
    );
}
