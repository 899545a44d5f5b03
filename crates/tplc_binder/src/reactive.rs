//! Dependency extraction and update-trigger naming.

use rustc_hash::FxHashSet;
use tplc_ast::node::{Expression, Identifier};
use tplc_ast::visitor::AstVisitor;

/// Collects sigil references, first appearance wins.
#[derive(Default)]
struct ReferenceCollector {
    seen: FxHashSet<String>,
    references: Vec<Identifier>,
}

impl AstVisitor for ReferenceCollector {
    fn visit_identifier(&mut self, node: &Identifier) {
        if node.has_sigil && self.seen.insert(node.name.clone()) {
            self.references.push(node.clone());
        }
    }
}

/// Every distinct `$`-prefixed identifier in `initializer`, in order of first appearance.
pub fn collect_references(initializer: &Expression) -> Vec<Identifier> {
    let mut collector = ReferenceCollector::default();
    collector.visit_expression(initializer);
    collector.references
}

/// Names (sigil stripped) that `initializer` depends on.
pub fn analyze_dependencies(initializer: &Expression) -> Vec<String> {
    collect_references(initializer)
        .into_iter()
        .map(|ident| ident.name)
        .collect()
}

/// The consumers that must be notified when `name` changes.
///
/// The set is a fixed naming convention and does not depend on the
/// initializer.
pub fn analyze_update_triggers(name: &str, _initializer: Option<&Expression>) -> Vec<String> {
    vec![
        format!("ui-element-{}", name),
        format!("template-binding-{}", name),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tplc_ast::node::{CompoundExpression, Literal, LiteralValue};
    use tplc_core::text::SourceLocation;

    fn ident(name: &str, has_sigil: bool) -> Expression {
        Expression::Identifier(Identifier {
            name: name.to_string(),
            has_sigil,
            location: SourceLocation::start(),
        })
    }

    #[test]
    fn test_dedupes_in_first_appearance_order() {
        let expr = Expression::Compound(CompoundExpression {
            raw: "$b + $a + $b + c".to_string(),
            operands: vec![
                ident("b", true),
                ident("a", true),
                ident("b", true),
                ident("c", false),
            ],
            location: SourceLocation::start(),
        });
        assert_eq!(analyze_dependencies(&expr), vec!["b", "a"]);
        assert_eq!(collect_references(&expr).len(), 2);
    }

    #[test]
    fn test_literal_has_no_dependencies() {
        let expr = Expression::Literal(Literal {
            value: LiteralValue::Integer(0),
            raw: "0".to_string(),
            location: SourceLocation::start(),
        });
        assert!(analyze_dependencies(&expr).is_empty());
    }

    #[test]
    fn test_update_triggers() {
        assert_eq!(
            analyze_update_triggers("count", None),
            vec!["ui-element-count", "template-binding-count"]
        );
    }
}
