//! Last-good snapshot cache
//!
//! The whole symbol table lives behind an `ArcSwap`: readers load the current
//! table without taking a lock, writers publish a new table with the entry
//! replaced. A reader therefore sees either the old snapshot or the new one,
//! never a mix.

use arc_swap::ArcSwap;
use meridian_core::{MarketSnapshot, Symbol};
use std::collections::HashMap;
use std::sync::Arc;

type SnapshotTable = HashMap<Symbol, Arc<MarketSnapshot>>;

/// Per-symbol cache of the most recent successful snapshot.
///
/// Last successful write wins. Cloning shares the same underlying table.
#[derive(Clone, Default)]
pub struct SnapshotCache {
    table: Arc<ArcSwap<SnapshotTable>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot for a symbol
    pub fn get(&self, symbol: &str) -> Option<Arc<MarketSnapshot>> {
        self.table.load().get(symbol).cloned()
    }

    /// Replace the symbol's entry with `snapshot`
    pub fn insert(&self, snapshot: Arc<MarketSnapshot>) {
        self.table.rcu(|current| {
            let mut next = SnapshotTable::clone(current);
            next.insert(snapshot.symbol.clone(), Arc::clone(&snapshot));
            next
        });
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.table.load().contains_key(symbol)
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.table.load().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }
}
