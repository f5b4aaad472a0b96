//! Simulated emergency alert endpoints
//!
//! Alerts are data records only; no notification is delivered.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use hw_common::db::models::{AlertRecord, ContactSnapshot};
use serde::Deserialize;

use crate::db::{alerts, contacts, readings};
use crate::{ApiError, ApiResult, AppState};

/// Demo location used when the caller provides none
const DEMO_LOCATION: &str = "GPS: 29.3759, 47.9774 (demo)";

#[derive(Debug, Deserialize)]
pub struct TriggerAlertRequest {
    pub location: Option<String>,
}

/// POST /api/alerts (protected)
///
/// Records a simulated emergency alert for the user's latest reading
/// with a snapshot of the current contact list.
pub async fn trigger_alert(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    Json(payload): Json<TriggerAlertRequest>,
) -> ApiResult<(StatusCode, Json<AlertRecord>)> {
    let latest = readings::latest(&state.db, user.guid).await?.ok_or_else(|| {
        ApiError::NotFound("no reading available; simulate or upload first".to_string())
    })?;

    let recipients: Vec<ContactSnapshot> = contacts::list(&state.db, user.guid)
        .await?
        .iter()
        .map(ContactSnapshot::from)
        .collect();

    let location = payload
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEMO_LOCATION);

    let alert = alerts::record(
        &state.db,
        user.guid,
        latest.guid,
        Some(location),
        &recipients,
    )
    .await?;

    tracing::info!(
        user = %user.guid,
        reading = %latest.guid,
        recipients = alert.recipients.len(),
        "Emergency alert simulated"
    );

    Ok((StatusCode::CREATED, Json(alert)))
}

#[derive(Debug, Deserialize)]
pub struct ListAlertsParams {
    pub limit: Option<i64>,
}

/// GET /api/alerts?limit (protected)
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    Query(params): Query<ListAlertsParams>,
) -> ApiResult<Json<Vec<AlertRecord>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    Ok(Json(alerts::list(&state.db, user.guid, limit).await?))
}
