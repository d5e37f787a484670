//! Aggregated blueprints and raw materials of a resolution

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::ItemId;

/// Totals keyed by item id.
///
/// Blueprints are kept once each, in the order they were first met during
/// the depth-first expansion. Components only ever hold raw materials.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Totals {
    blueprints: Vec<ItemId>,
    components: BTreeMap<ItemId, u64>,
    #[serde(skip)]
    seen_blueprints: HashSet<ItemId>,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a blueprint, returning `true` the first time it is seen
    pub fn add_blueprint(&mut self, id: ItemId) -> bool {
        if !self.seen_blueprints.insert(id) {
            return false;
        }
        self.blueprints.push(id);
        true
    }

    /// Adds to a raw material and returns its new total, or `None` (leaving
    /// the total untouched) if it would overflow
    pub fn add_component(&mut self, id: ItemId, quantity: u64) -> Option<u64> {
        let total = self.components.entry(id).or_default();
        *total = total.checked_add(quantity)?;
        Some(*total)
    }

    pub fn blueprints(&self) -> &[ItemId] {
        &self.blueprints
    }

    /// Raw materials in ascending id order
    pub fn components(&self) -> &BTreeMap<ItemId, u64> {
        &self.components
    }

    #[cfg(test)]
    pub fn component(&self, id: ItemId) -> u64 {
        self.components.get(&id).copied().unwrap_or(0)
    }
}
