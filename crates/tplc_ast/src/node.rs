//! AST node definitions for the template language.
//!
//! Nodes are closed sum types over the declaration, statement and
//! expression kinds the parser produces. Every node carries the
//! [`SourceLocation`] of its first token.

use crate::types::{ModernFeatures, SyntaxVersion, TypeInfo};
use serde::Serialize;
use tplc_core::text::SourceLocation;

// ============================================================================
// Program
// ============================================================================

/// The parsed body of one template file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub body: Vec<Declaration>,
    pub syntax_version: SyntaxVersion,
    pub modern_feature_flags: ModernFeatures,
}

impl Program {
    /// Iterate over every reactive declaration in the top-level body.
    pub fn reactive_declarations(&self) -> impl Iterator<Item = &ReactiveVariableDeclaration> {
        self.body.iter().filter_map(|decl| match decl {
            Declaration::ReactiveVariable(reactive) => Some(reactive),
            _ => None,
        })
    }

    /// Find a top-level declaration by name.
    pub fn find(&self, name: &str) -> Option<&Declaration> {
        self.body.iter().find(|decl| decl.name() == name)
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Declaration {
    #[serde(rename = "VariableDeclaration")]
    Variable(VariableDeclaration),
    #[serde(rename = "ReactiveVariableDeclaration")]
    ReactiveVariable(ReactiveVariableDeclaration),
    #[serde(rename = "FunctionDeclaration")]
    Function(FunctionDeclaration),
    #[serde(rename = "ClassDeclaration")]
    Class(ClassDeclaration),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Variable(n) => &n.name,
            Declaration::ReactiveVariable(n) => &n.declaration.name,
            Declaration::Function(n) => &n.name,
            Declaration::Class(n) => &n.name,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Declaration::Variable(n) => n.location,
            Declaration::ReactiveVariable(n) => n.declaration.location,
            Declaration::Function(n) => n.location,
            Declaration::Class(n) => n.location,
        }
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self, Declaration::ReactiveVariable(_))
    }
}

/// How a variable was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKeyword {
    /// `$name = ...`
    Sigil,
    Let,
    Const,
    Var,
    /// A class member without a sigil, or a constructor parameter property.
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub name: String,
    pub keyword: DeclarationKeyword,
    pub has_reactive_marker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<TypeInfo>,
    pub initializer: Option<Expression>,
    pub inferred_type: TypeInfo,
    pub location: SourceLocation,
}

/// A variable declared with the reactive marker (`$name! = ...`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveVariableDeclaration {
    #[serde(flatten)]
    pub declaration: VariableDeclaration,
    pub update_triggers: Vec<String>,
    pub dependencies: Vec<String>,
}

impl ReactiveVariableDeclaration {
    pub fn name(&self) -> &str {
        &self.declaration.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// The explicit return annotation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type_annotation: Option<TypeInfo>,
    /// The annotation when present, otherwise the inferred default.
    pub return_type: TypeInfo,
    pub body: FunctionBody,
    pub is_async: bool,
    pub auto_bind_self: bool,
    pub location: SourceLocation,
}

/// Constructor parameter access modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub has_sigil: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<TypeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Expression>,
    pub inferred_type: TypeInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
    pub is_readonly: bool,
    pub is_rest: bool,
    pub location: SourceLocation,
}

impl Parameter {
    /// Whether a constructor assigns this parameter to a property of the same name.
    pub fn auto_assign(&self) -> bool {
        self.accessibility.is_some() || self.is_readonly
    }
}

/// A function or method body.
///
/// Expression bodies (`=> expr`) are stored as a single return statement
/// with `implicit_return` set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionBody {
    pub statements: Vec<Statement>,
    pub implicit_return: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    pub name: String,
    pub properties: Vec<PropertyDeclaration>,
    pub methods: Vec<FunctionDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorDeclaration>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDeclaration {
    #[serde(flatten)]
    pub variable: VariableDeclaration,
    /// Introduced by an access-modified constructor parameter.
    pub from_constructor: bool,
    /// Empty unless the member carries the reactive marker.
    pub update_triggers: Vec<String>,
    /// Reactive names the initializer reads; empty for plain members.
    pub dependencies: Vec<String>,
}

impl PropertyDeclaration {
    pub fn name(&self) -> &str {
        &self.variable.name
    }

    pub fn is_reactive(&self) -> bool {
        self.variable.has_reactive_marker
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorDeclaration {
    pub parameters: Vec<Parameter>,
    pub body: FunctionBody,
    pub location: SourceLocation,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Statement {
    #[serde(rename = "Declaration")]
    Declaration(Declaration),
    #[serde(rename = "ExpressionStatement")]
    Expression(ExpressionStatement),
    #[serde(rename = "ReturnStatement")]
    Return(ReturnStatement),
    #[serde(rename = "ThrowStatement")]
    Throw(ThrowStatement),
    #[serde(rename = "BreakStatement")]
    Break(JumpStatement),
    #[serde(rename = "ContinueStatement")]
    Continue(JumpStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrowStatement {
    pub argument: Expression,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JumpStatement {
    pub location: SourceLocation,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Literal(Literal),
    Identifier(Identifier),
    #[serde(rename = "ArrayLiteral")]
    Array(ArrayLiteral),
    #[serde(rename = "ObjectLiteral")]
    Object(ObjectLiteral),
    /// Anything larger than a single operand: kept as raw text plus the
    /// shallow list of operand leaves.
    #[serde(rename = "CompoundExpression")]
    Compound(CompoundExpression),
}

impl Expression {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expression::Literal(n) => n.location,
            Expression::Identifier(n) => n.location,
            Expression::Array(n) => n.location,
            Expression::Object(n) => n.location,
            Expression::Compound(n) => n.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Template(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    /// Source text exactly as written, quotes included.
    pub raw: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    /// The name without the sigil.
    pub name: String,
    pub has_sigil: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayLiteral {
    pub elements: Vec<Expression>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectLiteral {
    pub properties: Vec<ObjectProperty>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundExpression {
    pub raw: String,
    pub operands: Vec<Expression>,
    pub location: SourceLocation,
}
