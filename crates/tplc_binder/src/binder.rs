//! The dependency resolution pass.
//!
//! Runs once the whole file is parsed. Each reactive declaration's
//! dependency list is recomputed from its initializer and filtered to the
//! reactive names visible where it is declared: the file's top level, plus
//! the enclosing class members, parameters and block declarations for
//! nested ones. Dropped references are reported:
//! - a `$name` declared but not reactive
//! - a `$name` not declared in any enclosing scope
//! - a declaration referencing itself

use crate::reactive::collect_references;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tplc_ast::node::*;
use tplc_diagnostics::{messages, Diagnostic, DiagnosticCollection};

/// Resolved dependency edges between the top-level reactive declarations of one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyGraph {
    /// Reactive name to the names it reads, in declaration order.
    pub dependencies: IndexMap<String, Vec<String>>,
    /// Reactive name to the names that read it.
    pub dependents: IndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.dependencies.get(name).map_or(&[], |v| v.as_slice())
    }

    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.dependents.get(name).map_or(&[], |v| v.as_slice())
    }

    /// Every declaration that must re-run when `name` changes, nearest first.
    pub fn affected_by(&self, name: &str) -> Vec<String> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.insert(name);
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::from([name]);
        while let Some(current) = queue.pop_front() {
            for dependent in self.dependents_of(current) {
                if seen.insert(dependent.as_str()) {
                    order.push(dependent.clone());
                    queue.push_back(dependent.as_str());
                }
            }
        }
        order
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// What a name was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaredAs {
    Reactive,
    Plain,
}

/// Names visible at one nesting level. Inner declarations shadow outer ones.
type Scope = FxHashMap<String, DeclaredAs>;

fn declared_as(reactive: bool) -> DeclaredAs {
    if reactive {
        DeclaredAs::Reactive
    } else {
        DeclaredAs::Plain
    }
}

/// Resolves reactive dependencies for one program.
pub struct Binder {
    diagnostics: DiagnosticCollection,
}

impl Binder {
    pub fn new() -> Self {
        Self {
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Filter every reactive declaration's dependencies and build the graph.
    ///
    /// Declarations nested in function bodies and reactive class members
    /// are filtered against their enclosing scopes; the graph records the
    /// top-level declarations only.
    pub fn bind_program(&mut self, program: &mut Program) -> DependencyGraph {
        let scope: Scope = program
            .body
            .iter()
            .map(|decl| (decl.name().to_string(), declared_as(decl.is_reactive())))
            .collect();

        let mut graph = DependencyGraph::default();
        for decl in program.body.iter_mut() {
            if let Declaration::ReactiveVariable(reactive) = decl {
                let resolved = self.resolve(&reactive.declaration, &scope);
                reactive.dependencies = resolved.clone();
                graph.dependencies.insert(reactive.name().to_string(), resolved);
            }
            self.bind_nested(decl, &scope);
        }

        for (name, dependencies) in &graph.dependencies {
            graph.dependents.entry(name.clone()).or_default();
            for dependency in dependencies {
                graph
                    .dependents
                    .entry(dependency.clone())
                    .or_default()
                    .push(name.clone());
            }
        }

        tracing::debug!(reactive = graph.dependencies.len(), "resolved dependencies");
        graph
    }

    fn bind_nested(&mut self, decl: &mut Declaration, scope: &Scope) {
        match decl {
            Declaration::Function(func) => self.bind_body(&func.parameters, &mut func.body, scope),
            Declaration::Class(class) => self.bind_class(class, scope),
            Declaration::Variable(_) | Declaration::ReactiveVariable(_) => {}
        }
    }

    fn bind_body(&mut self, parameters: &[Parameter], body: &mut FunctionBody, outer: &Scope) {
        let mut scope = outer.clone();
        for param in parameters {
            scope.insert(param.name.clone(), DeclaredAs::Plain);
        }
        for statement in &body.statements {
            if let Statement::Declaration(decl) = statement {
                scope.insert(decl.name().to_string(), declared_as(decl.is_reactive()));
            }
        }

        for statement in body.statements.iter_mut() {
            if let Statement::Declaration(decl) = statement {
                if let Declaration::ReactiveVariable(reactive) = decl {
                    reactive.dependencies = self.resolve(&reactive.declaration, &scope);
                }
                self.bind_nested(decl, &scope);
            }
        }
    }

    fn bind_class(&mut self, class: &mut ClassDeclaration, outer: &Scope) {
        let mut scope = outer.clone();
        for prop in &class.properties {
            scope.insert(prop.name().to_string(), declared_as(prop.is_reactive()));
        }
        for method in &class.methods {
            scope.insert(method.name.clone(), DeclaredAs::Plain);
        }

        for prop in class.properties.iter_mut().filter(|p| p.is_reactive()) {
            prop.dependencies = self.resolve(&prop.variable, &scope);
        }
        if let Some(ref mut ctor) = class.constructor {
            self.bind_body(&ctor.parameters, &mut ctor.body, &scope);
        }
        for method in class.methods.iter_mut() {
            self.bind_body(&method.parameters, &mut method.body, &scope);
        }
    }

    fn resolve(&mut self, variable: &VariableDeclaration, scope: &Scope) -> Vec<String> {
        let initializer = match variable.initializer {
            Some(ref init) => init,
            None => return Vec::new(),
        };
        let owner = variable.name.as_str();
        let mut resolved = Vec::new();
        for reference in collect_references(initializer) {
            let length = reference.name.len() as u32 + 1;
            let diagnostic = if reference.name == owner {
                Diagnostic::new(reference.location, &messages::SELF_DEPENDENCY, &[owner])
            } else {
                match scope.get(&reference.name) {
                    Some(DeclaredAs::Reactive) => {
                        resolved.push(reference.name);
                        continue;
                    }
                    Some(DeclaredAs::Plain) => Diagnostic::new(
                        reference.location,
                        &messages::DEPENDENCY_NOT_REACTIVE,
                        &[&reference.name, owner],
                    ),
                    None => Diagnostic::new(
                        reference.location,
                        &messages::DEPENDENCY_NOT_DECLARED,
                        &[&reference.name, owner],
                    ),
                }
            };
            self.diagnostics.add(diagnostic.with_length(length));
        }
        resolved
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}
