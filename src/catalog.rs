//! Catalog loading and lookups
//!
//! The catalog is made of three JSON files which are loaded independently:
//! a failure in one leaves that table empty but does not stop the others.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::thread;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, info};

use crate::config::DataPaths;
use crate::error::CatalogError;
use crate::models::{ItemId, Recipe, RecipeRecord};

/// Read-only lookup tables shared by every resolution
#[derive(Debug, Default)]
pub struct Catalog {
    recipes: HashMap<ItemId, Recipe>,
    names: HashMap<ItemId, String>,
    ids: HashMap<String, ItemId>,
}

impl Catalog {
    /// Load all three sources concurrently.
    ///
    /// A source that cannot be read or parsed is logged and left empty, so
    /// the returned catalog may be partially or entirely unusable.
    pub fn load(paths: &DataPaths) -> Self {
        let (recipes, names, ids) = thread::scope(|s| {
            let recipes = s.spawn(|| load_recipes(paths.recipes()));
            // type_ids.json maps id -> name, type_names.json maps name -> id
            let names = s.spawn(|| load_ids(paths.ids()));
            let ids = s.spawn(|| load_names(paths.names()));
            (
                settle("recipes", recipes.join()),
                settle("type ids", names.join()),
                settle("type names", ids.join()),
            )
        });

        let catalog = Self { recipes, names, ids };
        info!(
            recipes = catalog.recipes.len(),
            names = catalog.names.len(),
            products = catalog.ids.len(),
            "catalog loaded from {}",
            paths.data_dir().display()
        );
        catalog
    }

    /// Load all three sources, failing on the first one that is unusable
    pub fn load_strict(paths: &DataPaths) -> Result<Self, CatalogError> {
        Ok(Self {
            recipes: load_recipes(paths.recipes())?,
            ids: load_names(paths.names())?,
            names: load_ids(paths.ids())?,
        })
    }

    /// Build a catalog in memory; the name -> id table is derived from the names
    pub fn from_parts(
        recipes: impl IntoIterator<Item = (ItemId, Recipe)>,
        names: impl IntoIterator<Item = (ItemId, String)>,
    ) -> Self {
        let names: HashMap<ItemId, String> = names.into_iter().collect();
        let ids = names.iter().map(|(id, name)| (name.clone(), *id)).collect();
        Self {
            recipes: recipes.into_iter().collect(),
            names,
            ids,
        }
    }

    pub fn recipe(&self, id: ItemId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Display name of an item, or its id when it has none
    pub fn display_name(&self, id: ItemId) -> Cow<'_, str> {
        match self.names.get(&id) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(id.to_string()),
        }
    }

    /// Resolve a product by exact name, falling back to a literal numeric id
    pub fn lookup(&self, query: &str) -> Option<ItemId> {
        self.ids
            .get(query)
            .copied()
            .or_else(|| query.parse().ok())
    }

    /// Names available for product search
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.names.is_empty() && self.ids.is_empty()
    }
}

fn settle<T: Default>(source: &str, joined: thread::Result<Result<T, CatalogError>>) -> T {
    match joined {
        Ok(Ok(table)) => table,
        Ok(Err(e)) => {
            error!(source, "{}", e);
            T::default()
        }
        Err(_) => {
            error!(source, "catalog loader thread panicked");
            T::default()
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let write_err = |source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| CatalogError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(write_err)
}

/// Load `bp_ids.json`
pub fn load_recipes(path: &Path) -> Result<HashMap<ItemId, Recipe>, CatalogError> {
    let records: HashMap<ItemId, RecipeRecord> = read_json(path)?;
    Ok(records
        .into_iter()
        .map(|(id, record)| (id, Recipe::from(record)))
        .collect())
}

/// Load `type_names.json`
pub fn load_names(path: &Path) -> Result<HashMap<String, ItemId>, CatalogError> {
    read_json(path)
}

/// Load `type_ids.json`. Ids without a name are dropped.
pub fn load_ids(path: &Path) -> Result<HashMap<ItemId, String>, CatalogError> {
    let raw: HashMap<ItemId, Option<String>> = read_json(path)?;
    Ok(raw
        .into_iter()
        .filter_map(|(id, name)| name.map(|name| (id, name)))
        .collect())
}

/// Catalog contents in their on-disk shape, as produced by extraction
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CatalogData {
    pub recipes: BTreeMap<ItemId, RecipeRecord>,
    pub names: BTreeMap<ItemId, Option<String>>,
}

impl CatalogData {
    /// name -> id, skipping unnamed ids. Later ids win on duplicate names.
    pub fn name_index(&self) -> BTreeMap<&str, ItemId> {
        self.names
            .iter()
            .filter_map(|(id, name)| name.as_deref().map(|name| (name, *id)))
            .collect()
    }

    /// Write all three data files
    pub fn write(&self, paths: &DataPaths) -> Result<(), CatalogError> {
        paths.ensure_dir().map_err(|source| CatalogError::Write {
            path: paths.data_dir().to_path_buf(),
            source,
        })?;
        write_json(paths.ids(), &self.names)?;
        write_json(paths.names(), &self.name_index())?;
        write_json(paths.recipes(), &self.recipes)?;
        info!(
            recipes = self.recipes.len(),
            names = self.names.len(),
            "wrote catalog to {}",
            paths.data_dir().display()
        );
        Ok(())
    }

    pub fn into_catalog(self) -> Catalog {
        Catalog::from_parts(
            self.recipes
                .into_iter()
                .map(|(id, record)| (id, Recipe::from(record))),
            self.names
                .into_iter()
                .filter_map(|(id, name)| name.map(|name| (id, name))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn rifter_files(dir: &Path) {
        write_file(
            dir,
            crate::config::RECIPES_FILE,
            r#"{"587": {"o": 1, "b": 691, "i": [[32000, 34], [6000, 35]]}}"#,
        );
        write_file(
            dir,
            crate::config::NAMES_FILE,
            r#"{"Rifter": 587, "Rifter Blueprint": 691, "Tritanium": 34}"#,
        );
        write_file(
            dir,
            crate::config::IDS_FILE,
            r#"{"587": "Rifter", "691": "Rifter Blueprint", "34": "Tritanium", "35": null}"#,
        );
    }

    #[test]
    fn loads_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        rifter_files(dir.path());

        let catalog = Catalog::load(&DataPaths::new(dir.path()));
        assert!(matches!(
            catalog.recipe(ItemId(587)),
            Some(Recipe::Manufactured { output_quantity: 1, blueprint: Some(ItemId(691)), .. })
        ));
        assert_eq!(catalog.lookup("Rifter"), Some(ItemId(587)));
        assert_eq!(catalog.display_name(ItemId(34)), "Tritanium");
        // null name falls back to the id
        assert_eq!(catalog.display_name(ItemId(35)), "35");
    }

    #[test]
    fn failed_source_leaves_others_usable() {
        let dir = tempfile::tempdir().unwrap();
        rifter_files(dir.path());
        write_file(dir.path(), crate::config::RECIPES_FILE, "{ not json");

        let catalog = Catalog::load(&DataPaths::new(dir.path()));
        assert!(catalog.recipe(ItemId(587)).is_none());
        assert_eq!(catalog.lookup("Rifter"), Some(ItemId(587)));
        assert_eq!(catalog.display_name(ItemId(587)), "Rifter");
    }

    #[test]
    fn missing_directory_yields_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load(&DataPaths::new(dir.path().join("absent")));
        assert!(catalog.is_empty());
    }

    #[test]
    fn strict_load_reports_the_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        rifter_files(dir.path());
        write_file(dir.path(), crate::config::NAMES_FILE, "[1, 2]");

        let err = Catalog::load_strict(&DataPaths::new(dir.path())).unwrap_err();
        match err {
            CatalogError::Parse { path, .. } => {
                assert!(path.ends_with(crate::config::NAMES_FILE))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lookup_prefers_names_then_literal_ids() {
        let catalog = Catalog::from_parts(
            Vec::<(ItemId, Recipe)>::new(),
            [(ItemId(587), "Rifter".to_string()), (ItemId(1), "42".to_string())],
        );
        assert_eq!(catalog.lookup("Rifter"), Some(ItemId(587)));
        assert_eq!(catalog.lookup("42"), Some(ItemId(1)));
        assert_eq!(catalog.lookup("587"), Some(ItemId(587)));
        assert_eq!(catalog.lookup("Slasher"), None);
    }

    #[test]
    fn catalog_data_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path().join("out"));

        let mut data = CatalogData::default();
        data.recipes.insert(
            ItemId(587),
            RecipeRecord {
                output_quantity: Some(1),
                blueprint: Some(ItemId(691)),
                ingredients: Some(vec![Ingredient { quantity: 32000.0, item: ItemId(34) }]),
            },
        );
        data.names.insert(ItemId(587), Some("Rifter".to_string()));
        data.names.insert(ItemId(34), Some("Tritanium".to_string()));
        data.names.insert(ItemId(691), None);
        data.write(&paths).unwrap();

        let loaded = Catalog::load_strict(&paths).unwrap();
        assert_eq!(loaded.lookup("Tritanium"), Some(ItemId(34)));
        assert_eq!(loaded.display_name(ItemId(691)), "691");
        assert_eq!(
            loaded.recipe(ItemId(587)),
            data.into_catalog().recipe(ItemId(587))
        );
    }
}
