//! Manufacturing tree expansion
//!
//! Walks the recipe graph depth-first from a requested product, rounding
//! every step up to whole runs. Surplus from batch rounding goes into a
//! [`StorageLedger`] and is drawn down by later requests for the same item
//! anywhere else in the tree.

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::CalcError;
use crate::ledger::StorageLedger;
use crate::models::{ItemId, Node, NodeKind, Recipe, StorageNote};
use crate::totals::Totals;

/// Largest ingredient quantity an `f64` still represents exactly (2^53)
const MAX_EXACT_QUANTITY: f64 = 9_007_199_254_740_992.0;

/// Result of resolving one product request
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub root: Node,
    pub totals: Totals,
}

pub struct Expander<'a> {
    catalog: &'a Catalog,
}

impl<'a> Expander<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve a product by name or literal id.
    ///
    /// Returns `Ok(None)` when the query matches nothing with a recipe.
    pub fn resolve_query(&self, query: &str, quantity: u64) -> Result<Option<Resolution>, CalcError> {
        match self.catalog.lookup(query) {
            Some(id) => self.resolve(id, quantity),
            None => Ok(None),
        }
    }

    /// Expand `quantity` units of `id` with a fresh storage ledger.
    ///
    /// Returns `Ok(None)` when `id` has no recipe entry.
    pub fn resolve(&self, id: ItemId, quantity: u64) -> Result<Option<Resolution>, CalcError> {
        if self.catalog.recipe(id).is_none() {
            debug!(%id, "no recipe entry");
            return Ok(None);
        }

        let mut ledger = StorageLedger::new();
        let mut totals = Totals::new();
        let root = self.expand(id, quantity, &mut ledger, &mut totals)?;
        Ok(Some(Resolution { root, totals }))
    }

    /// Expand `requested` units of `id`, drawing from and adding to `ledger`
    /// and accumulating into `totals`.
    ///
    /// `requested` must be positive.
    pub fn expand(
        &self,
        id: ItemId,
        requested: u64,
        ledger: &mut StorageLedger,
        totals: &mut Totals,
    ) -> Result<Node, CalcError> {
        debug_assert!(requested > 0, "requested quantity must be positive");
        let mut chain = Vec::new();
        self.expand_item(id, requested, ledger, totals, &mut chain)
    }

    fn expand_item(
        &self,
        id: ItemId,
        requested: u64,
        ledger: &mut StorageLedger,
        totals: &mut Totals,
        chain: &mut Vec<ItemId>,
    ) -> Result<Node, CalcError> {
        let recipe = self.catalog.recipe(id);

        let taken = ledger.draw(id, requested);
        let remaining = requested - taken;

        let output_quantity = recipe.map_or(1, Recipe::output_quantity);
        let runs = remaining.div_ceil(output_quantity);
        let produced = output_quantity
            .checked_mul(runs)
            .ok_or(CalcError::QuantityOverflow { id })?;
        let surplus = produced - remaining;

        if surplus > 0 {
            ledger.deposit(id, surplus);
        }
        if recipe.is_none() && runs > 0 && totals.add_component(id, produced).is_none() {
            return Err(CalcError::QuantityOverflow { id });
        }

        let note = (taken > 0 || surplus > 0).then(|| StorageNote {
            taken,
            made: (surplus > 0).then_some(produced),
            balance: ledger.balance(id),
        });

        debug!(%id, requested, taken, runs, produced, surplus, "expanded");

        let mut node = Node {
            id,
            kind: NodeKind::Item,
            name: self.catalog.display_name(id).into_owned(),
            quantity: requested,
            runs,
            note,
            children: Vec::new(),
        };

        let Some(Recipe::Manufactured {
            blueprint,
            ingredients,
            ..
        }) = recipe
        else {
            return Ok(node);
        };
        if runs == 0 {
            return Ok(node);
        }

        // A repeat fully covered by storage returned above and is not a cycle
        if chain.contains(&id) {
            let mut path = chain.clone();
            path.push(id);
            return Err(CalcError::CycleDetected { path });
        }

        if let Some(blueprint) = *blueprint {
            totals.add_blueprint(blueprint);
            let name = self.catalog.display_name(blueprint).into_owned();
            node.children.push(Node::blueprint(blueprint, name));
        }

        chain.push(id);
        for ingredient in ingredients {
            let scaled = (ingredient.quantity * runs as f64).ceil();
            if !scaled.is_finite() || scaled > MAX_EXACT_QUANTITY {
                return Err(CalcError::QuantityOverflow { id: ingredient.item });
            }
            let needed = scaled as u64;
            let child = self.expand_item(ingredient.item, needed, ledger, totals, chain)?;
            node.children.push(child);
        }
        chain.pop();

        Ok(node)
    }
}
