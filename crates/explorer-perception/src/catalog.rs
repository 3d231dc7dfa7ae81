//! Object catalog: lower-cased label → [`CatalogEntry`].
//!
//! Loaded once at startup from a JSON object such as
//!
//! ```json
//! { "chair": { "name": "chair", "type": "furniture", "description": "Seat" } }
//! ```
//!
//! and read-only afterwards.  Entries are read one by one: a missing `name`
//! falls back to the label, a missing `type` to [`DEFAULT_CATEGORY`], and an
//! entry that is not an object of strings is skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use explorer_types::{CatalogEntry, ExplorerError};
use serde::Deserialize;
use tracing::{info, warn};

/// Category for catalog entries that do not name one.
pub const DEFAULT_CATEGORY: &str = "furniture";

/// One catalog entry as written in the file; every field is optional.
#[derive(Debug, Deserialize)]
struct RawEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    category: Option<String>,
    #[serde(default)]
    description: String,
}

impl RawEntry {
    fn into_entry(self, label: &str) -> CatalogEntry {
        CatalogEntry {
            name: self.name.unwrap_or_else(|| label.to_string()),
            category: self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document.  Keys are lower-cased.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Catalog`] when the document is not a JSON object.
    /// Individual bad entries are skipped with a warning instead.
    pub fn from_json_str(raw: &str) -> Result<Self, ExplorerError> {
        let parsed: HashMap<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| ExplorerError::Catalog(format!("malformed catalog: {e}")))?;

        let mut catalog = Self::new();
        for (label, value) in parsed {
            match serde_json::from_value::<RawEntry>(value) {
                Ok(raw) => {
                    let entry = raw.into_entry(&label);
                    catalog.insert(&label, entry);
                }
                Err(e) => warn!(%label, error = %e, "skipping malformed catalog entry"),
            }
        }
        Ok(catalog)
    }

    /// Read and parse the catalog at `path`.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::Catalog`] when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ExplorerError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ExplorerError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Like [`Catalog::from_path`], but a missing or malformed file yields an
    /// empty catalog.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(catalog) => {
                info!(path = %path.display(), entries = catalog.len(), "catalog loaded");
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "catalog unavailable; using empty catalog");
                Self::new()
            }
        }
    }

    pub fn insert(&mut self, label: &str, entry: CatalogEntry) {
        self.entries.insert(label.to_lowercase(), entry);
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, label: &str) -> Option<&CatalogEntry> {
        self.entries.get(&label.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CatalogEntry)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, CatalogEntry)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (label, entry) in iter {
            catalog.insert(&label, entry);
        }
        catalog
    }
}
