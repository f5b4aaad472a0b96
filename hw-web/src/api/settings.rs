//! Classifier threshold settings endpoints

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::db::settings;
use crate::ingest::Thresholds;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/settings/thresholds (protected)
pub async fn get_thresholds(
    State(state): State<AppState>,
    Extension(_user): Extension<super::CurrentUser>,
) -> ApiResult<Json<Thresholds>> {
    Ok(Json(settings::load_thresholds(&state.db).await?))
}

#[derive(Debug, Serialize)]
pub struct SaveThresholdsResponse {
    pub success: bool,
    pub thresholds: Thresholds,
}

/// PUT /api/settings/thresholds (protected)
///
/// Request: `{"low_bpm": 45, "elevated_bpm": 121, "high_bpm": 150}`.
/// Rejected with 400 unless 0 < low < elevated <= high.
pub async fn put_thresholds(
    State(state): State<AppState>,
    Extension(_user): Extension<super::CurrentUser>,
    Json(payload): Json<Thresholds>,
) -> ApiResult<Json<SaveThresholdsResponse>> {
    payload.validate().map_err(ApiError::BadRequest)?;

    settings::save_thresholds(&state.db, &payload).await?;
    tracing::info!(
        low = payload.low_bpm,
        elevated = payload.elevated_bpm,
        high = payload.high_bpm,
        "Classifier thresholds updated"
    );

    Ok(Json(SaveThresholdsResponse {
        success: true,
        thresholds: payload,
    }))
}
