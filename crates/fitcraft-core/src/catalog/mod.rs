//! Exercise catalog: an immutable, per-session snapshot of known exercises.
//!
//! The catalog is owned by an external service; this module only holds the
//! snapshot and answers lookups on it. Sources live in [`source`], muscle
//! group classification in [`groups`].

pub mod groups;
pub mod source;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use groups::{MuscleGroup, group_by_muscle};
pub use source::{CatalogSource, FileCatalogSource, HttpCatalogSource, parse_catalog_json};

/// Default catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://exercicios-mauve.vercel.app/gif_index.json";

/// Default host prefixed to asset paths.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://gifs.fitcraft.com.br";

/// One known exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name; unique within a catalog.
    pub name: String,
    /// Free-form category from the catalog service (e.g. "Peitoral").
    pub category: String,
    /// Path of the demonstration asset, relative to the asset host.
    #[serde(rename = "path")]
    pub asset_path: String,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        asset_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            asset_path: asset_path.into(),
        }
    }
}

/// Errors loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be fetched or read.
    #[error("exercise catalog unavailable: {0}")]
    Unavailable(String),

    /// The payload was not a list of catalog entries.
    #[error("exercise catalog has an invalid format: {0}")]
    InvalidFormat(String),
}

/// Ordered catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, keeping the first entry for each repeated name.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.name.clone()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with exactly this name.
    pub fn find_exact(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Render the catalog as the listing embedded in generation prompts.
    ///
    /// One `- Name (Category)` line per entry; the category is omitted when
    /// empty.
    pub fn format_listing(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                if e.category.is_empty() {
                    format!("- {}", e.name)
                } else {
                    format!("- {} ({})", e.name, e.category)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Absolute URL of an asset path on `base_url`.
pub fn asset_url(base_url: &str, asset_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        asset_path.trim_start_matches('/')
    )
}
