//! Semantic type descriptors and file-level flag types.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// The base kind of a [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    String,
    Number,
    Float,
    Boolean,
    Array,
    Object,
    Function,
    Any,
}

impl BaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            BaseType::String => "string",
            BaseType::Number => "number",
            BaseType::Float => "float",
            BaseType::Boolean => "boolean",
            BaseType::Array => "array",
            BaseType::Object => "object",
            BaseType::Function => "function",
            BaseType::Any => "any",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A semantic type descriptor.
///
/// `base_type` is always set. Absence of information is `any` + nullable,
/// see [`TypeInfo::any`]. The structural parts are empty when unused.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub base_type: BaseType,
    pub nullable: bool,
    /// Element types of containers (`T[]`) and deferred-result wrappers (`Promise<T>`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic: Vec<TypeInfo>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, TypeInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<TypeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<Box<TypeInfo>>,
}

impl TypeInfo {
    pub fn new(base_type: BaseType) -> Self {
        Self {
            base_type,
            nullable: false,
            generic: Vec::new(),
            properties: IndexMap::new(),
            parameters: Vec::new(),
            return_type: None,
        }
    }

    /// The "nothing is known" type.
    pub fn any() -> Self {
        Self::new(BaseType::Any).with_nullable(true)
    }

    pub fn string() -> Self {
        Self::new(BaseType::String)
    }

    pub fn number() -> Self {
        Self::new(BaseType::Number)
    }

    pub fn float() -> Self {
        Self::new(BaseType::Float)
    }

    pub fn boolean() -> Self {
        Self::new(BaseType::Boolean)
    }

    pub fn array_of(element: TypeInfo) -> Self {
        let mut ty = Self::new(BaseType::Array);
        ty.generic.push(element);
        ty
    }

    pub fn object_with(properties: IndexMap<String, TypeInfo>) -> Self {
        let mut ty = Self::new(BaseType::Object);
        ty.properties = properties;
        ty
    }

    /// An object wrapping a deferred result of type `inner`.
    pub fn deferred(inner: TypeInfo) -> Self {
        let mut ty = Self::new(BaseType::Object);
        ty.generic.push(inner);
        ty
    }

    pub fn function(parameters: Vec<TypeInfo>, return_type: TypeInfo) -> Self {
        let mut ty = Self::new(BaseType::Function);
        ty.parameters = parameters;
        ty.return_type = Some(Box::new(return_type));
        ty
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        self.base_type == BaseType::Any
    }

    /// Two types are compatible if their base kinds match or either is `any`.
    pub fn is_compatible_with(&self, other: &TypeInfo) -> bool {
        self.is_any() || other.is_any() || self.base_type == other.base_type
    }
}

impl Default for TypeInfo {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.base_type {
            BaseType::Array if self.generic.len() == 1 => write!(f, "{}[]", self.generic[0])?,
            BaseType::Object if !self.generic.is_empty() => {
                write!(f, "object<")?;
                for (i, arg) in self.generic.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")?;
            }
            BaseType::Object if !self.properties.is_empty() => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in self.properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                write!(f, " }}")?;
            }
            BaseType::Function if self.return_type.is_some() => {
                write!(f, "(")?;
                for (i, param) in self.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") => ")?;
                if let Some(ref ret) = self.return_type {
                    write!(f, "{}", ret)?;
                }
            }
            base => write!(f, "{}", base)?,
        }
        if self.nullable && !self.is_any() {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// The surface dialect of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxVersion {
    Legacy,
    Modern,
}

impl SyntaxVersion {
    /// Combine two observations. Modern always wins; nothing downgrades.
    pub fn join(self, other: SyntaxVersion) -> SyntaxVersion {
        if self == SyntaxVersion::Modern || other == SyntaxVersion::Modern {
            SyntaxVersion::Modern
        } else {
            SyntaxVersion::Legacy
        }
    }
}

impl fmt::Display for SyntaxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxVersion::Legacy => write!(f, "legacy"),
            SyntaxVersion::Modern => write!(f, "modern"),
        }
    }
}

bitflags::bitflags! {
    /// Modern-dialect features observed in a file.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
    #[serde(transparent)]
    pub struct ModernFeatures: u16 {
        const SIGIL_VARIABLES       = 1 << 0;
        const REACTIVE_MARKERS      = 1 << 1;
        const TYPE_ANNOTATIONS      = 1 << 2;
        const ARROW_FUNCTIONS       = 1 << 3;
        const TEMPLATE_BINDINGS     = 1 << 4;
        const OMITTED_TERMINATORS   = 1 << 5;
        const CLASS_MEMBERS         = 1 << 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_nullable() {
        let ty = TypeInfo::any();
        assert_eq!(ty.base_type, BaseType::Any);
        assert!(ty.nullable);
        assert_eq!(TypeInfo::default(), ty);
    }

    #[test]
    fn test_compatibility() {
        assert!(TypeInfo::string().is_compatible_with(&TypeInfo::string()));
        assert!(TypeInfo::string().is_compatible_with(&TypeInfo::any()));
        assert!(TypeInfo::any().is_compatible_with(&TypeInfo::float()));
        assert!(!TypeInfo::string().is_compatible_with(&TypeInfo::float()));
        assert!(!TypeInfo::number().is_compatible_with(&TypeInfo::float()));
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeInfo::array_of(TypeInfo::number()).to_string(), "number[]");
        assert_eq!(TypeInfo::deferred(TypeInfo::any()).to_string(), "object<any>");
        assert_eq!(
            TypeInfo::function(vec![TypeInfo::string()], TypeInfo::boolean()).to_string(),
            "(string) => boolean"
        );
        assert_eq!(TypeInfo::string().with_nullable(true).to_string(), "string?");
    }

    #[test]
    fn test_syntax_version_join_never_downgrades() {
        assert_eq!(SyntaxVersion::Modern.join(SyntaxVersion::Legacy), SyntaxVersion::Modern);
        assert_eq!(SyntaxVersion::Legacy.join(SyntaxVersion::Legacy), SyntaxVersion::Legacy);
    }
}
