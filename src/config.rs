use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const RECIPES_FILE: &str = "bp_ids.json";
pub const NAMES_FILE: &str = "type_names.json";
pub const IDS_FILE: &str = "type_ids.json";

/// Locations of the three catalog data files
#[derive(Debug, Clone)]
pub struct DataPaths {
    data_dir: PathBuf,
    recipes: PathBuf,
    names: PathBuf,
    ids: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            recipes: data_dir.join(RECIPES_FILE),
            names: data_dir.join(NAMES_FILE),
            ids: data_dir.join(IDS_FILE),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `bp_ids.json`: product id -> recipe
    pub fn recipes(&self) -> &Path {
        &self.recipes
    }

    /// `type_names.json`: display name -> id
    pub fn names(&self) -> &Path {
        &self.names
    }

    /// `type_ids.json`: id -> display name
    pub fn ids(&self) -> &Path {
        &self.ids
    }

    /// Creates the data directory if it does not exist yet
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
