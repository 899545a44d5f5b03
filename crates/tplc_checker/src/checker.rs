//! The type inference engine.
//!
//! Inference is literal-driven: quoted text is `string`, integers are
//! `number`, decimals are `float`, `true`/`false` are `boolean`, bracketed
//! lists are arrays and braced pairs are objects. Identifiers resolve through
//! the symbol table. Everything else is `any`.

use crate::error::TypeValidationError;
use crate::symbol::SymbolTable;
use indexmap::IndexMap;
use std::fmt;
use tplc_ast::node::*;
use tplc_ast::types::{BaseType, TypeInfo};
use tplc_core::text::SourceLocation;

/// One incompatible pair found while validating an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConflict {
    /// Where inside the declared type the conflict sits, e.g. `items[]` or `user.name`.
    pub path: String,
    pub expected: TypeInfo,
    pub actual: TypeInfo,
}

impl fmt::Display for TypeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is annotated '{}' but inferred '{}'",
            self.path, self.expected, self.actual
        )
    }
}

/// The result of checking an annotation against an inferred type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub conflicts: Vec<TypeConflict>,
}

/// Infers types and validates annotations for one file.
#[derive(Debug, Default)]
pub struct TypeChecker {
    symbols: SymbolTable,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
        }
    }

    // ========================================================================
    // Symbol table
    // ========================================================================

    /// Record the type of a declared name.
    pub fn register_variable(&mut self, name: &str, ty: TypeInfo) {
        tracing::trace!(name, ty = %ty, "register variable");
        self.symbols.set(name, ty);
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    // ========================================================================
    // Inference
    // ========================================================================

    /// Infer the type of an expression. Never fails.
    pub fn infer_type(&self, expr: &Expression) -> TypeInfo {
        match expr {
            Expression::Literal(lit) => infer_literal(&lit.value),
            Expression::Identifier(ident) => self
                .lookup(&ident.name)
                .cloned()
                .unwrap_or_else(TypeInfo::any),
            Expression::Array(array) => TypeInfo::array_of(self.common_element_type(&array.elements)),
            Expression::Object(object) => {
                let properties: IndexMap<String, TypeInfo> = object
                    .properties
                    .iter()
                    .map(|prop| (prop.key.clone(), self.infer_type(&prop.value)))
                    .collect();
                TypeInfo::object_with(properties)
            }
            Expression::Compound(_) => TypeInfo::any(),
        }
    }

    /// Infer the type of an optional initializer; a missing one is `any`.
    pub fn infer_initializer(&self, initializer: Option<&Expression>) -> TypeInfo {
        initializer.map_or_else(TypeInfo::any, |expr| self.infer_type(expr))
    }

    /// The element type shared by every element, or `any` when they differ.
    fn common_element_type(&self, elements: &[Expression]) -> TypeInfo {
        let mut types = elements.iter().map(|e| self.infer_type(e));
        let first = match types.next() {
            Some(first) => first,
            None => return TypeInfo::any(),
        };
        if types.all(|ty| ty.base_type == first.base_type) {
            first
        } else {
            TypeInfo::any()
        }
    }

    /// A parameter's type: the annotation, else the default value's type, else nullable `any`.
    pub fn infer_parameter(
        &self,
        annotation: Option<&TypeInfo>,
        default_value: Option<&Expression>,
    ) -> TypeInfo {
        match (annotation, default_value) {
            (Some(annotation), _) => annotation.clone(),
            (None, Some(default)) => self.infer_type(default),
            (None, None) => TypeInfo::any(),
        }
    }

    /// The return type of a function without an explicit return annotation.
    ///
    /// Asynchronous functions return a deferred-result wrapper around `any`.
    pub fn default_return_type(is_async: bool) -> TypeInfo {
        if is_async {
            TypeInfo::deferred(TypeInfo::any())
        } else {
            TypeInfo::any()
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Compare an annotation with the inferred type of `name`.
    ///
    /// Only concrete (non-`any`) pairs with different base kinds conflict.
    /// Element types and shared object properties are compared the same way.
    pub fn validate_annotation(
        &self,
        annotation: &TypeInfo,
        inferred: &TypeInfo,
        name: &str,
    ) -> ValidationResult {
        let mut conflicts = Vec::new();
        collect_conflicts(annotation, inferred, name.to_string(), &mut conflicts);
        ValidationResult {
            is_valid: conflicts.is_empty(),
            conflicts,
        }
    }

    /// Validate and turn the first conflict into an error.
    pub fn check_annotation(
        &self,
        name: &str,
        annotation: &TypeInfo,
        inferred: &TypeInfo,
        location: SourceLocation,
    ) -> Result<(), TypeValidationError> {
        let result = self.validate_annotation(annotation, inferred, name);
        if result.is_valid {
            return Ok(());
        }
        Err(TypeValidationError {
            name: name.to_string(),
            annotation: annotation.clone(),
            inferred: inferred.clone(),
            location,
        })
    }
}

fn collect_conflicts(
    expected: &TypeInfo,
    actual: &TypeInfo,
    path: String,
    conflicts: &mut Vec<TypeConflict>,
) {
    if expected.is_any() || actual.is_any() {
        return;
    }
    if expected.base_type != actual.base_type {
        conflicts.push(TypeConflict {
            path,
            expected: expected.clone(),
            actual: actual.clone(),
        });
        return;
    }

    if expected.generic.len() == actual.generic.len() {
        for (i, (e, a)) in expected.generic.iter().zip(&actual.generic).enumerate() {
            let nested = if expected.base_type == BaseType::Array {
                format!("{}[]", path)
            } else {
                format!("{}<{}>", path, i)
            };
            collect_conflicts(e, a, nested, conflicts);
        }
    }

    for (key, e) in &expected.properties {
        if let Some(a) = actual.properties.get(key) {
            collect_conflicts(e, a, format!("{}.{}", path, key), conflicts);
        }
    }
}

fn infer_literal(value: &LiteralValue) -> TypeInfo {
    match value {
        LiteralValue::String(_) | LiteralValue::Template(_) => TypeInfo::string(),
        LiteralValue::Integer(_) => TypeInfo::number(),
        LiteralValue::Float(_) => TypeInfo::float(),
        LiteralValue::Boolean(_) => TypeInfo::boolean(),
        LiteralValue::Null => TypeInfo::any(),
    }
}
