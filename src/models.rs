//! Data models for the industry catalog and resolution output

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// EVE type id of any item, blueprint or reaction formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ItemId)
    }
}

/// One `[quantity, item]` pair of a recipe. Quantity is per run and may be fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, ItemId)", into = "(f64, ItemId)")]
pub struct Ingredient {
    pub quantity: f64,
    pub item: ItemId,
}

impl From<(f64, ItemId)> for Ingredient {
    fn from((quantity, item): (f64, ItemId)) -> Self {
        Self { quantity, item }
    }
}

impl From<Ingredient> for (f64, ItemId) {
    fn from(ingredient: Ingredient) -> Self {
        (ingredient.quantity, ingredient.item)
    }
}

/// Recipe as stored in `bp_ids.json`: `{"o": 1, "b": 691, "i": [[22222, 34], ...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(rename = "o", default, skip_serializing_if = "Option::is_none")]
    pub output_quantity: Option<u64>,
    #[serde(rename = "b", default, skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<ItemId>,
    #[serde(rename = "i", default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
}

/// A recipe entry of the catalog.
///
/// Items without any entry are raw materials and never appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipe {
    /// Built from ingredients by running a blueprint
    Manufactured {
        output_quantity: u64,
        blueprint: Option<ItemId>,
        ingredients: Vec<Ingredient>,
    },
    /// Has an entry but nothing to consume; terminal like a raw material,
    /// yet still batch-rounded and never counted as one.
    NoInputs { output_quantity: u64 },
}

impl Recipe {
    /// Units produced per run, never zero
    pub fn output_quantity(&self) -> u64 {
        match self {
            Recipe::Manufactured { output_quantity, .. } | Recipe::NoInputs { output_quantity } => {
                *output_quantity
            }
        }
    }
}

impl From<RecipeRecord> for Recipe {
    fn from(record: RecipeRecord) -> Self {
        let output_quantity = record.output_quantity.filter(|&o| o > 0).unwrap_or(1);
        match record.ingredients {
            Some(ingredients) if !ingredients.is_empty() => Recipe::Manufactured {
                output_quantity,
                blueprint: record.blueprint,
                ingredients,
            },
            _ => Recipe::NoInputs { output_quantity },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Item,
    Blueprint,
}

/// Storage interaction of a single node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageNote {
    /// Units drawn from storage, 0 when nothing was drawn
    pub taken: u64,
    /// Units produced, set only when production left a surplus
    pub made: Option<u64>,
    /// Storage balance of the item after this node
    pub balance: u64,
}

impl fmt::Display for StorageNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if self.taken > 0 {
            write!(f, "Taking {} from storage. ", self.taken)?;
        }
        if let Some(made) = self.made {
            write!(f, "Makes {}. ", made)?;
        }
        write!(f, "Storage now {}.)", self.balance)
    }
}

/// One element of a resolved manufacturing tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: ItemId,
    pub kind: NodeKind,
    pub name: String,
    /// Quantity requested by the parent, before any storage draw
    pub quantity: u64,
    pub runs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<StorageNote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn blueprint(id: ItemId, name: String) -> Self {
        Self {
            id,
            kind: NodeKind::Blueprint,
            name,
            quantity: 1,
            runs: 0,
            note: None,
            children: Vec::new(),
        }
    }
}
