use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::Catalog,
    services::catalog::{parse_catalog, CatalogSource},
};

/// Reads the catalog from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load(&self) -> AppResult<Catalog> {
        tracing::debug!(path = %self.path.display(), "Reading catalog file");

        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::CatalogUnavailable(format!(
                "Cannot read catalog {}: {}",
                self.path.display(),
                e
            ))
        })?;

        parse_catalog(&raw, &self.path.display().to_string())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
