//! Catalog extraction from the EVE Static Data Export
//!
//! The SDE is large; only the types needed to build the products of one
//! market group (ships by default) are kept: the products themselves, every
//! blueprint and material reachable from them, their names and their
//! recipes.

use std::collections::HashSet;
use std::fmt;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::catalog::CatalogData;
use crate::config::DataPaths;
use crate::error::ExtractError;
use crate::models::{ItemId, RecipeRecord};
use crate::sde;

/// Market group "Ship"
pub const SHIP_MARKET_GROUP: i64 = 4;

#[derive(Debug, Default)]
pub struct ExtractStats {
    pub products: usize,
    pub types: usize,
    pub recipes: usize,
    pub unnamed: usize,
}

impl fmt::Display for ExtractStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Extracted {} types for {} products ({} recipes). Unnamed: {}",
            self.types, self.products, self.recipes, self.unnamed
        )
    }
}

/// Collect the products of `market_group` and everything needed to build them
pub fn extract_catalog(
    conn: &Connection,
    market_group: i64,
) -> Result<(CatalogData, ExtractStats), ExtractError> {
    let products = sde::market_group_types(conn, market_group)?;
    info!(market_group, products = products.len(), "found products");

    let mut relevant: Vec<ItemId> = products.iter().map(|(id, _)| *id).collect();
    let mut seen: HashSet<ItemId> = relevant.iter().copied().collect();
    for (id, _) in &products {
        collect_dependencies(conn, *id, &mut seen, &mut relevant)?;
    }
    info!(types = relevant.len(), "identified relevant types");

    let mut data = CatalogData::default();
    let mut stats = ExtractStats {
        products: products.len(),
        types: relevant.len(),
        ..Default::default()
    };

    for &id in &relevant {
        let name = sde::type_name(conn, id)?;
        if name.is_none() {
            stats.unnamed += 1;
        }
        data.names.insert(id, name);

        let Some(blueprint) = sde::producing_blueprint(conn, id)? else {
            continue;
        };
        let record = RecipeRecord {
            output_quantity: sde::blueprint_output(conn, blueprint)?,
            blueprint: Some(blueprint),
            ingredients: Some(sde::blueprint_materials(conn, blueprint)?),
        };
        data.recipes.insert(id, record);
    }
    stats.recipes = data.recipes.len();

    Ok((data, stats))
}

/// Depth-first walk adding the blueprint and materials of `id`
fn collect_dependencies(
    conn: &Connection,
    id: ItemId,
    seen: &mut HashSet<ItemId>,
    relevant: &mut Vec<ItemId>,
) -> Result<(), ExtractError> {
    let Some(blueprint) = sde::producing_blueprint(conn, id)? else {
        return Ok(());
    };
    if seen.insert(blueprint) {
        relevant.push(blueprint);
    }

    for material in sde::blueprint_materials(conn, blueprint)? {
        if seen.insert(material.item) {
            debug!(%id, material = %material.item, "new material");
            relevant.push(material.item);
            collect_dependencies(conn, material.item, seen, relevant)?;
        }
    }
    Ok(())
}

/// Extract and write the three catalog files
pub fn extract_to_files(
    conn: &Connection,
    market_group: i64,
    paths: &DataPaths,
) -> Result<ExtractStats, ExtractError> {
    let (data, stats) = extract_catalog(conn, market_group)?;
    data.write(paths)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Expander;
    use crate::catalog::Catalog;
    use crate::models::Ingredient;

    #[test]
    fn collects_products_and_dependencies() {
        let conn = sde::fixture();
        let (data, stats) = extract_catalog(&conn, SHIP_MARKET_GROUP).unwrap();

        let ids: Vec<u64> = data.names.keys().map(|id| id.0).collect();
        assert_eq!(
            ids,
            vec![34, 35, 587, 691, 11371, 11372, 11399, 11539, 11540, 16634, 16679, 46209]
        );
        // invention datacore and non-ship modules are left out
        assert!(!data.names.contains_key(&ItemId(20171)));
        assert!(!data.names.contains_key(&ItemId(2048)));

        assert_eq!(stats.products, 2);
        assert_eq!(stats.types, 12);
        assert_eq!(stats.recipes, 4);
        assert_eq!(stats.unnamed, 0);
    }

    #[test]
    fn records_recipes_in_wire_shape() {
        let conn = sde::fixture();
        let (data, _) = extract_catalog(&conn, SHIP_MARKET_GROUP).unwrap();

        assert_eq!(
            data.recipes[&ItemId(16679)],
            RecipeRecord {
                output_quantity: Some(3000),
                blueprint: Some(ItemId(46209)),
                ingredients: Some(vec![Ingredient { quantity: 100.0, item: ItemId(16634) }]),
            }
        );
        assert!(!data.recipes.contains_key(&ItemId(34)));
    }

    #[test]
    fn written_files_load_and_resolve() {
        let conn = sde::fixture();
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        extract_to_files(&conn, SHIP_MARKET_GROUP, &paths).unwrap();

        let catalog = Catalog::load_strict(&paths).unwrap();
        let resolution = Expander::new(&catalog)
            .resolve_query("Wolf", 1)
            .unwrap()
            .unwrap();

        let totals = &resolution.totals;
        assert_eq!(
            totals.blueprints(),
            &[ItemId(11372), ItemId(691), ItemId(11540), ItemId(46209)]
        );
        // 15 microprocessors in batches of 10 -> 2 runs
        assert_eq!(totals.component(ItemId(35)), 6000 + 200);
        assert_eq!(totals.component(ItemId(16634)), 100);
        assert_eq!(totals.component(ItemId(11399)), 40);
    }

    #[test]
    fn unknown_market_group_extracts_nothing() {
        let conn = sde::fixture();
        let (data, stats) = extract_catalog(&conn, 123456).unwrap();
        assert!(data.names.is_empty());
        assert!(data.recipes.is_empty());
        assert_eq!(stats.types, 0);
    }
}
