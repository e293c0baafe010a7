use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::Catalog,
    services::catalog::{parse_catalog, CatalogSource},
};

/// Fetches the catalog JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    http_client: HttpClient,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn load(&self) -> AppResult<Catalog> {
        tracing::debug!(url = %self.url, "Fetching catalog");

        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CatalogUnavailable(format!(
                "Catalog fetch returned status {}: {}",
                status, body
            )));
        }

        let raw = response.text().await?;
        parse_catalog(&raw, &self.url)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_catalog() {
        let app = Router::new().route(
            "/games.json",
            get(|| async { r#"{"slope":{"name":"Slope","category":"arcade"}}"# }),
        );
        let base = serve(app).await;

        let source = HttpCatalogSource::new(format!("{}/games.json", base));
        let catalog = source.load().await.unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog["slope"].name.as_deref(), Some("Slope"));
    }

    #[tokio::test]
    async fn test_fetch_catalog_error_status() {
        let app = Router::new().route(
            "/games.json",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let base = serve(app).await;

        let source = HttpCatalogSource::new(format!("{}/games.json", base));
        let result = source.load().await;

        assert!(matches!(result, Err(AppError::CatalogUnavailable(_))));
    }
}
