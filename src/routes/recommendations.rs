use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{ActivityRecord, ScoredGame},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub activity: Vec<Value>,
    #[serde(default)]
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    #[serde(default)]
    pub activity: Vec<Value>,
}

/// Decodes the activity log record by record, dropping entries that are not records
fn decode_activity(values: Vec<Value>) -> Vec<ActivityRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<ActivityRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping malformed activity record");
                None
            }
        })
        .collect()
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<ScoredGame>>> {
    let count = state.resolve_count(request.count)?;
    let activity = decode_activity(request.activity);

    tracing::info!(
        request_id = %request_id,
        activity_count = activity.len(),
        count,
        "Processing recommendation request"
    );

    let recommendations = state.engine.get_recommendations(&activity, count);

    tracing::info!(
        request_id = %request_id,
        returned = recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(recommendations))
}

/// Handler for the category preference profile
pub async fn preferences(
    State(state): State<AppState>,
    Json(request): Json<PreferencesRequest>,
) -> Json<BTreeMap<String, f64>> {
    let activity = decode_activity(request.activity);
    let preferences = state
        .engine
        .get_category_preferences(&activity)
        .into_iter()
        .collect();

    Json(preferences)
}
