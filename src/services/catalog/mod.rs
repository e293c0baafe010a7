use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{Catalog, GameRecord},
    services::{RecommendationEngine, SeriesRules},
};

pub mod file;
pub mod http;

pub use file::FileCatalogSource;
pub use http::HttpCatalogSource;

/// Where the game catalog comes from
///
/// The catalog is a JSON object mapping game key to game metadata. Sources
/// only move bytes; decoding is shared through [`parse_catalog`] so every
/// source rejects malformed documents the same way.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads the full catalog
    async fn load(&self) -> AppResult<Catalog>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Decodes a catalog document, keeping key order
///
/// The document must be a JSON object. Entries that are not game objects
/// are skipped rather than failing the whole catalog.
pub fn parse_catalog(raw: &str, origin: &str) -> AppResult<Catalog> {
    let entries: IndexMap<String, Value> = serde_json::from_str(raw).map_err(|e| {
        AppError::CatalogUnavailable(format!("Malformed catalog from {}: {}", origin, e))
    })?;

    let mut catalog = Catalog::with_capacity(entries.len());
    for (key, value) in entries {
        match serde_json::from_value::<GameRecord>(value) {
            Ok(game) => {
                catalog.insert(key, game);
            }
            Err(e) => {
                tracing::warn!(
                    origin = %origin,
                    key = %key,
                    error = %e,
                    "Skipping malformed catalog entry"
                );
            }
        }
    }

    Ok(catalog)
}

/// Loads the catalog and builds an engine around it
pub async fn load_engine(
    source: &dyn CatalogSource,
    series: SeriesRules,
) -> AppResult<RecommendationEngine> {
    let catalog = source.load().await.map_err(|e| {
        tracing::error!(source = source.name(), error = %e, "Catalog load failed");
        match e {
            AppError::CatalogUnavailable(_) => e,
            other => AppError::CatalogUnavailable(other.to_string()),
        }
    })?;

    if catalog.is_empty() {
        tracing::warn!(source = source.name(), "Catalog is empty");
    }

    tracing::info!(
        source = source.name(),
        games = catalog.len(),
        series_rules = series.len(),
        "Catalog loaded"
    );

    Ok(RecommendationEngine::with_series_rules(catalog, series))
}
