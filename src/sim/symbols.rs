//! Label to address mapping for loaded programs.

use std::collections::BTreeMap;

use serde::Serialize;

/// Maps assembly labels to instruction addresses.
///
/// Purely informational: execution never consults it, but snapshots and
/// frontends use it to annotate addresses.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SymbolTable {
    labels: BTreeMap<String, u64>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a label at an address, replacing any previous binding.
    pub fn insert(&mut self, label: impl Into<String>, addr: u64) {
        self.labels.insert(label.into(), addr);
    }

    /// The address a label is bound to, if any.
    pub fn resolve(&self, label: &str) -> Option<u64> {
        self.labels.get(label).copied()
    }

    /// The label bound to an address, if any.
    pub fn label_at(&self, addr: u64) -> Option<&str> {
        self.labels
            .iter()
            .find(|&(_, &a)| a == addr)
            .map(|(l, _)| l.as_str())
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the table has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
