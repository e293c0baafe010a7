use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{GameEntry, ScoredGame},
    routes::{AppState, CountQuery},
};

/// Lists the whole catalog in catalog order
pub async fn list(State(state): State<AppState>) -> Json<Vec<GameEntry>> {
    Json(state.engine.games())
}

/// Handler for the popularity list
pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<CountQuery>,
) -> AppResult<Json<Vec<ScoredGame>>> {
    let count = state.resolve_count(params.count)?;
    Ok(Json(state.engine.get_popular_games(count)))
}

/// Handler for games sharing a category tag
pub async fn by_category(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(params): Query<CountQuery>,
) -> AppResult<Json<Vec<GameEntry>>> {
    let count = state.resolve_count(params.count)?;
    let games = state.engine.get_games_by_category(&tag, count);

    tracing::debug!(tag = %tag, matched = games.len(), "Category lookup");

    Ok(Json(games))
}

/// Handler for games similar to a given one
pub async fn similar(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<CountQuery>,
) -> AppResult<Json<Vec<GameEntry>>> {
    let count = state.resolve_count(params.count)?;

    if !state.engine.catalog().contains_key(&key) {
        return Err(AppError::NotFound(format!("Game '{}'", key)));
    }

    Ok(Json(state.engine.get_similar_games(&key, count)))
}
