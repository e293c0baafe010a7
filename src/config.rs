use serde::Deserialize;
use std::sync::Arc;

use crate::services::{CatalogSource, FileCatalogSource, HttpCatalogSource, DEFAULT_COUNT};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the catalog JSON file
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Catalog URL, takes precedence over `catalog_path` when set
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Optional JSON file replacing the built-in series table
    #[serde(default)]
    pub series_rules_path: Option<String>,

    /// Number of games returned when a request does not say
    #[serde(default = "default_recommendation_count")]
    pub default_recommendation_count: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_path() -> String {
    "games.json".to_string()
}

fn default_recommendation_count() -> usize {
    DEFAULT_COUNT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_path: default_catalog_path(),
            catalog_url: None,
            series_rules_path: None,
            default_recommendation_count: default_recommendation_count(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Picks the catalog source, preferring the URL
    pub fn catalog_source(&self) -> Arc<dyn CatalogSource> {
        match &self.catalog_url {
            Some(url) if !url.is_empty() => Arc::new(HttpCatalogSource::new(url.clone())),
            _ => Arc::new(FileCatalogSource::new(&self.catalog_path)),
        }
    }
}
