//! Error types

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ItemId;

/// A catalog data file could not be read, parsed or written
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed catalog data in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("cycle detected in recipe graph: {}", format_path(.path))]
    CycleDetected { path: Vec<ItemId> },
    #[error("quantity of {id} exceeds the supported range")]
    QuantityOverflow { id: ItemId },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("SDE query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn format_path(path: &[ItemId]) -> String {
    path.iter().map(ItemId::to_string).collect::<Vec<_>>().join(" -> ")
}
