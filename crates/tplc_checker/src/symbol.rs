//! Per-file symbol table.

use rustc_hash::FxHashMap;
use tplc_ast::types::TypeInfo;

/// Maps declared names (sigil stripped) to their types.
///
/// A table lives for exactly one parse. Redeclaring a name replaces its type.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    table: FxHashMap<String, TypeInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.table.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, ty: TypeInfo) {
        self.table.insert(name.into(), ty);
    }

    pub fn has(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeInfo)> {
        self.table.iter()
    }
}
