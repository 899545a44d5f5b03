//! Mapping from written annotation names to type descriptors.
//!
//! The parser owns the annotation grammar (`T[]`, `T?`, `{ a: T }`,
//! `(a: T) => R`, unions with `null`); this module only resolves a bare or
//! generic-applied name such as `string` or `Promise<number>`.

use tplc_ast::types::{BaseType, TypeInfo};

/// Resolve a named annotation with its (possibly empty) type arguments.
///
/// Names that are not built in denote object types. Type arguments beyond
/// the first level are kept as written but never interpreted further.
pub fn named_type(name: &str, arguments: Vec<TypeInfo>) -> TypeInfo {
    match name {
        "string" => TypeInfo::string(),
        "number" | "int" => TypeInfo::number(),
        "float" => TypeInfo::float(),
        "boolean" | "bool" => TypeInfo::boolean(),
        "any" | "unknown" => TypeInfo::any(),
        "void" | "null" | "undefined" => TypeInfo::any(),
        "function" | "Function" => TypeInfo::new(BaseType::Function),
        "Array" | "array" => {
            TypeInfo::array_of(arguments.into_iter().next().unwrap_or_else(TypeInfo::any))
        }
        "Promise" => TypeInfo::deferred(arguments.into_iter().next().unwrap_or_else(TypeInfo::any)),
        _ => {
            let mut ty = TypeInfo::new(BaseType::Object);
            ty.generic = arguments;
            ty
        }
    }
}

/// Whether `name` is one of the built-in annotation names.
pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "string"
            | "number"
            | "int"
            | "float"
            | "boolean"
            | "bool"
            | "any"
            | "unknown"
            | "void"
            | "null"
            | "undefined"
            | "object"
            | "function"
            | "Function"
            | "Array"
            | "array"
            | "Promise"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(named_type("int", vec![]), TypeInfo::number());
        assert_eq!(named_type("bool", vec![]), TypeInfo::boolean());
        assert!(named_type("unknown", vec![]).is_any());
    }

    #[test]
    fn test_generic_wrappers() {
        let promise = named_type("Promise", vec![TypeInfo::string()]);
        assert_eq!(promise.base_type, BaseType::Object);
        assert_eq!(promise.generic, vec![TypeInfo::string()]);

        let list = named_type("Array", vec![]);
        assert_eq!(list.to_string(), "any[]");
    }

    #[test]
    fn test_unknown_name_is_object() {
        let user = named_type("User", vec![]);
        assert_eq!(user.base_type, BaseType::Object);
        assert!(!is_builtin("User"));
    }
}
