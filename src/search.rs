//! Product name search

use regex::Regex;

use crate::catalog::Catalog;

/// Case-insensitive substring search over product names.
///
/// Blueprints and reaction formulas share the name table with products but
/// are never something a user wants to build, so they are filtered out.
pub struct ProductSearch {
    excluded: Regex,
}

impl ProductSearch {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            excluded: Regex::new(r"(?:Blueprint|Reaction Formula)$")?,
        })
    }

    /// Matching names in alphabetical order, at most `limit` of them
    pub fn find<'c>(&self, catalog: &'c Catalog, query: &str, limit: Option<usize>) -> Vec<&'c str> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<&str> = catalog
            .names()
            .filter(|name| name.to_lowercase().contains(&query))
            .filter(|name| !self.excluded.is_match(name))
            .collect();
        found.sort_unstable();
        found.truncate(limit.unwrap_or(usize::MAX));
        found
    }
}
