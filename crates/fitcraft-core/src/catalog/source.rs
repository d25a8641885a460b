//! Catalog sources: where a session's catalog snapshot comes from.
//!
//! The payload is a flat JSON array of `{name, category, path}` objects.
//! Items without a usable name are dropped; anything that is not an array is
//! rejected. A failed load is reported once and never retried here.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::{Catalog, CatalogEntry, CatalogError};

const CONNECT_TIMEOUT_SECS: u64 = 15;

/// A place a catalog snapshot can be loaded from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable description for logs (URL or file path).
    fn describe(&self) -> String;

    /// Load a fresh snapshot.
    async fn fetch(&self) -> Result<Catalog, CatalogError>;
}

/// Parse a catalog payload.
pub fn parse_catalog_json(text: &str) -> Result<Catalog, CatalogError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| CatalogError::InvalidFormat(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(CatalogError::InvalidFormat(
            "expected a JSON array of exercises".to_string(),
        ));
    };

    let total = items.len();
    let entries: Vec<CatalogEntry> = items.iter().filter_map(entry_from_value).collect();
    if entries.len() < total {
        debug!(
            dropped = total - entries.len(),
            "catalog items without a name were dropped"
        );
    }
    Ok(Catalog::new(entries))
}

fn entry_from_value(item: &Value) -> Option<CatalogEntry> {
    let name = item.get("name")?.as_str().filter(|n| !n.is_empty())?;
    let text = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(CatalogEntry::new(name, text("category"), text("path")))
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Catalog served over HTTP (`GET url`).
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::Unavailable(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!(
                "catalog service returned HTTP {}",
                status.as_u16()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;
        let catalog = parse_catalog_json(&text)?;
        info!(entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Catalog stored in a local JSON file with the same layout as the service.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CatalogError::Unavailable(format!("failed to read {}: {e}", self.path.display()))
        })?;
        parse_catalog_json(&text)
    }
}
