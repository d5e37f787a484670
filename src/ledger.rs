//! Surplus storage for a single resolution

use std::collections::HashMap;

use crate::models::ItemId;

/// Units left over from batch production, available to later requests of
/// the same item within one resolution. Missing entries read as zero.
#[derive(Debug, Default, Clone)]
pub struct StorageLedger {
    stock: HashMap<ItemId, u64>,
}

impl StorageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, id: ItemId) -> u64 {
        self.stock.get(&id).copied().unwrap_or(0)
    }

    /// Takes up to `wanted` units out of storage and returns how many were taken
    pub fn draw(&mut self, id: ItemId, wanted: u64) -> u64 {
        let Some(stored) = self.stock.get_mut(&id) else {
            return 0;
        };
        let taken = wanted.min(*stored);
        *stored -= taken;
        taken
    }

    pub fn deposit(&mut self, id: ItemId, quantity: u64) {
        *self.stock.entry(id).or_default() += quantity;
    }
}
