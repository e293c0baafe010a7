use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{RecommendationEngine, DEFAULT_COUNT},
};

pub mod games;
pub mod recommendations;

/// Shared application state
///
/// The engine is read-only after startup, so handlers share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub default_count: usize,
}

impl AppState {
    pub fn new(engine: RecommendationEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            default_count: DEFAULT_COUNT,
        }
    }

    pub fn with_default_count(mut self, default_count: usize) -> Self {
        self.default_count = default_count;
        self
    }

    /// Resolves the requested result size, rejecting zero
    pub fn resolve_count(&self, requested: Option<usize>) -> AppResult<usize> {
        match requested {
            Some(0) => Err(AppError::InvalidInput(
                "count must be a positive integer".to_string(),
            )),
            Some(count) => Ok(count),
            None => Ok(self.default_count),
        }
    }
}

/// Optional `?count=` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct CountQuery {
    pub count: Option<usize>,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/preferences", post(recommendations::preferences))
        .route("/games", get(games::list))
        .route("/games/popular", get(games::popular))
        .route("/games/:key/similar", get(games::similar))
        .route("/categories/:tag/games", get(games::by_category))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "games": state.engine.len() })),
    )
}
