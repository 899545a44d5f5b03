//! AST visitor trait for traversing the syntax tree.
//!
//! Default method implementations walk into children, so an implementor only
//! overrides the node kinds it cares about.

use crate::node::*;

/// A visitor that traverses the AST.
pub trait AstVisitor {
    fn visit_program(&mut self, node: &Program) {
        for decl in &node.body {
            self.visit_declaration(decl);
        }
    }

    fn visit_declaration(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Variable(n) => self.visit_variable_declaration(n),
            Declaration::ReactiveVariable(n) => self.visit_reactive_variable_declaration(n),
            Declaration::Function(n) => self.visit_function_declaration(n),
            Declaration::Class(n) => self.visit_class_declaration(n),
        }
    }

    // -- Declarations --

    fn visit_variable_declaration(&mut self, node: &VariableDeclaration) {
        if let Some(ref init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_reactive_variable_declaration(&mut self, node: &ReactiveVariableDeclaration) {
        self.visit_variable_declaration(&node.declaration);
    }

    fn visit_function_declaration(&mut self, node: &FunctionDeclaration) {
        for param in &node.parameters {
            self.visit_parameter(param);
        }
        self.visit_function_body(&node.body);
    }

    fn visit_class_declaration(&mut self, node: &ClassDeclaration) {
        for prop in &node.properties {
            self.visit_variable_declaration(&prop.variable);
        }
        if let Some(ref ctor) = node.constructor {
            for param in &ctor.parameters {
                self.visit_parameter(param);
            }
            self.visit_function_body(&ctor.body);
        }
        for method in &node.methods {
            self.visit_function_declaration(method);
        }
    }

    fn visit_parameter(&mut self, node: &Parameter) {
        if let Some(ref default) = node.default_value {
            self.visit_expression(default);
        }
    }

    fn visit_function_body(&mut self, node: &FunctionBody) {
        for stmt in &node.statements {
            self.visit_statement(stmt);
        }
    }

    // -- Statements --

    fn visit_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Declaration(n) => self.visit_declaration(n),
            Statement::Expression(n) => self.visit_expression(&n.expression),
            Statement::Return(n) => {
                if let Some(ref arg) = n.argument {
                    self.visit_expression(arg);
                }
            }
            Statement::Throw(n) => self.visit_expression(&n.argument),
            Statement::Break(_) | Statement::Continue(_) => {}
        }
    }

    // -- Expressions --

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_identifier(&mut self, _node: &Identifier) {}

    fn visit_literal(&mut self, _node: &Literal) {}
}

/// Walk the children of an expression, dispatching each to the visitor.
pub fn walk_expression<V: AstVisitor + ?Sized>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Literal(n) => visitor.visit_literal(n),
        Expression::Identifier(n) => visitor.visit_identifier(n),
        Expression::Array(n) => {
            for element in &n.elements {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(n) => {
            for prop in &n.properties {
                visitor.visit_expression(&prop.value);
            }
        }
        Expression::Compound(n) => {
            for operand in &n.operands {
                visitor.visit_expression(operand);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tplc_core::text::SourceLocation;

    struct IdentifierCounter(usize);

    impl AstVisitor for IdentifierCounter {
        fn visit_identifier(&mut self, _node: &Identifier) {
            self.0 += 1;
        }
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(Identifier {
            name: name.to_string(),
            has_sigil: true,
            location: SourceLocation::start(),
        })
    }

    #[test]
    fn test_walk_nested_expression() {
        let expr = Expression::Compound(CompoundExpression {
            raw: "[$a, $b] + $c".to_string(),
            operands: vec![
                Expression::Array(ArrayLiteral {
                    elements: vec![ident("a"), ident("b")],
                    location: SourceLocation::start(),
                }),
                ident("c"),
            ],
            location: SourceLocation::start(),
        });
        let mut counter = IdentifierCounter(0);
        counter.visit_expression(&expr);
        assert_eq!(counter.0, 3);
    }
}
