use crate::error::{Result, StoreError};
use crate::index::{bucket_sizes, define_handle, index_insert, index_remove, Index};
use codescope_extractor::{Symbol, SymbolKind};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

define_handle!(
    /// Handle of a stored symbol; stable across overwrites of the same key
    SymbolId,
    "symbol"
);

/// Symbols keyed by `module_path.qualified_name`
#[derive(Debug, Default)]
pub struct SymbolStore {
    symbols: BTreeMap<SymbolId, Symbol>,
    keys: HashMap<String, SymbolId>,
    by_name: Index<String, SymbolId>,
    by_kind: Index<SymbolKind, SymbolId>,
    by_module: Index<String, SymbolId>,
    by_file: Index<String, SymbolId>,
    references: HashMap<String, Vec<String>>,
    next_id: u64,
}

impl SymbolStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, replacing any symbol stored under the same key
    pub fn save(&mut self, symbol: Symbol) -> SymbolId {
        let key = symbol.key();
        let id = match self.keys.get(&key) {
            Some(&id) => {
                if let Some(old) = self.symbols.remove(&id) {
                    self.unindex(id, &old);
                }
                id
            }
            None => {
                let id = SymbolId(self.next_id);
                self.next_id += 1;
                self.keys.insert(key, id);
                id
            }
        };

        index_insert(&mut self.by_name, symbol.name.clone(), id);
        index_insert(&mut self.by_kind, symbol.kind, id);
        index_insert(&mut self.by_module, symbol.module_path.clone(), id);
        index_insert(&mut self.by_file, symbol.file_path.clone(), id);
        self.symbols.insert(id, symbol);
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    /// Exact key first, then the first symbol named `name` or whose key ends in `.name`
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Symbol> {
        if let Some(symbol) = self.keys.get(name).and_then(|id| self.symbols.get(id)) {
            return Some(symbol);
        }
        // a key ending in `.name` always belongs to a symbol named after the last segment
        let last = name.rsplit('.').next().unwrap_or(name);
        let suffix = format!(".{name}");
        self.by_name
            .get(last)
            .into_iter()
            .flatten()
            .filter_map(|id| self.symbols.get_key_value(id))
            .filter(|(_, symbol)| symbol.name == name || symbol.key().ends_with(&suffix))
            .min_by_key(|(id, _)| **id)
            .map(|(_, symbol)| symbol)
    }

    #[must_use]
    pub fn find_by_kind(&self, kind: SymbolKind) -> Vec<&Symbol> {
        self.resolve(self.by_kind.get(&kind))
    }

    #[must_use]
    pub fn find_by_module(&self, module_path: &str) -> Vec<&Symbol> {
        self.resolve(self.by_module.get(module_path))
    }

    #[must_use]
    pub fn find_by_file(&self, file_path: &str) -> Vec<&Symbol> {
        self.resolve(self.by_file.get(file_path))
    }

    /// All symbols in first-insertion order of their keys
    #[must_use]
    pub fn get_all(&self) -> Vec<&Symbol> {
        self.symbols.values().collect()
    }

    /// Remove the symbol stored under `key`
    pub fn delete(&mut self, key: &str) -> Result<Symbol> {
        let id = self
            .keys
            .remove(key)
            .ok_or_else(|| StoreError::UnknownSymbol(key.to_string()))?;
        let symbol = self.symbols.remove(&id).ok_or_else(|| id.unknown())?;
        self.unindex(id, &symbol);
        Ok(symbol)
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.keys.clear();
        self.by_name.clear();
        self.by_kind.clear();
        self.by_module.clear();
        self.by_file.clear();
        self.references.clear();
    }

    /// Record that `reference` uses the symbol stored under `key`
    pub fn add_reference(&mut self, key: impl Into<String>, reference: impl Into<String>) {
        self.references
            .entry(key.into())
            .or_default()
            .push(reference.into());
    }

    #[must_use]
    pub fn references(&self, key: &str) -> &[String] {
        self.references.get(key).map_or(&[], Vec::as_slice)
    }

    /// Symbols nothing has been recorded as referencing
    #[must_use]
    pub fn find_unused(&self) -> Vec<&Symbol> {
        self.symbols
            .values()
            .filter(|symbol| !self.references.contains_key(&symbol.key()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn statistics(&self) -> SymbolStatistics {
        SymbolStatistics {
            total_symbols: self.symbols.len(),
            symbols_by_kind: bucket_sizes(&self.by_kind, |kind| kind.as_str().to_string()),
            symbols_by_module: bucket_sizes(&self.by_module, String::clone),
            symbols_by_file: bucket_sizes(&self.by_file, String::clone),
            unused_symbols_count: self.find_unused().len(),
        }
    }

    fn unindex(&mut self, id: SymbolId, symbol: &Symbol) {
        index_remove(&mut self.by_name, symbol.name.as_str(), &id);
        index_remove(&mut self.by_kind, &symbol.kind, &id);
        index_remove(&mut self.by_module, symbol.module_path.as_str(), &id);
        index_remove(&mut self.by_file, symbol.file_path.as_str(), &id);
    }

    fn resolve(&self, ids: Option<&Vec<SymbolId>>) -> Vec<&Symbol> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.symbols.get(id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolStatistics {
    pub total_symbols: usize,
    pub symbols_by_kind: BTreeMap<String, usize>,
    pub symbols_by_module: BTreeMap<String, usize>,
    pub symbols_by_file: BTreeMap<String, usize>,
    pub unused_symbols_count: usize,
}
