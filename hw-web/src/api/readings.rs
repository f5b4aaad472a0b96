//! Reading history and simulation endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use hw_common::db::models::{StoredReading, Tag};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::readings::AppendOutcome;
use crate::db::{readings, settings};
use crate::ingest::{classify, parser, CandidateReading};
use crate::{ApiError, ApiResult, AppState};

const DEFAULT_LIMIT: i64 = 200;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReadingsResponse {
    pub readings: Vec<StoredReading>,
}

/// GET /api/readings?from&to&limit (protected)
///
/// Bounds accept the same timestamp formats as uploads.
pub async fn list_readings(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<ReadingsResponse>> {
    let from = parse_bound(params.from.as_deref(), "from")?;
    let to = parse_bound(params.to.as_deref(), "to")?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let readings = readings::query_range(&state.db, user.guid, from, to, limit).await?;
    Ok(Json(ReadingsResponse { readings }))
}

/// GET /api/readings/latest (protected)
pub async fn latest_reading(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
) -> ApiResult<Json<Option<StoredReading>>> {
    Ok(Json(readings::latest(&state.db, user.guid).await?))
}

fn parse_bound(
    raw: Option<&str>,
    name: &str,
) -> Result<Option<chrono::DateTime<Utc>>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => parser::parse_timestamp(value).map(Some).ok_or_else(|| {
            ApiError::BadRequest(format!("unparseable {} timestamp: {}", name, value))
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    /// normal | abnormal | attack | random (default)
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub bpm: i64,
    pub tag: Tag,
    /// False when an identical (ts, bpm) sample already existed
    pub stored: bool,
}

/// POST /api/simulate (protected)
///
/// Generates one reading in the selected band, classifies it with the
/// configured thresholds, and appends it to history.
pub async fn simulate(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    Json(payload): Json<SimulateRequest>,
) -> ApiResult<Json<SimulateResponse>> {
    let mode = payload.mode.as_deref().unwrap_or("random");
    let bpm = generate_bpm(mode);

    let thresholds = settings::load_thresholds(&state.db).await?;
    let tag = classify(bpm, None, &thresholds);

    let candidate = CandidateReading {
        ts: Utc::now(),
        bpm,
        label: None,
    };
    let outcome = readings::append(&state.db, user.guid, &candidate, tag).await?;

    tracing::info!(user = %user.guid, bpm, tag = %tag, mode, "Simulated reading");

    Ok(Json(SimulateResponse {
        bpm,
        tag,
        stored: matches!(outcome, AppendOutcome::Inserted(_)),
    }))
}

/// Simulated bpm bands per mode; "random" draws 90% normal, 7%
/// elevated, 2% low, 1% spike
fn generate_bpm(mode: &str) -> i64 {
    let mut rng = rand::thread_rng();
    match mode {
        "normal" => rng.gen_range(60..=90),
        "abnormal" => {
            if rng.gen_bool(0.5) {
                rng.gen_range(121..=150)
            } else {
                rng.gen_range(35..=44)
            }
        }
        "attack" => rng.gen_range(155..=190),
        _ => {
            let roll: f64 = rng.gen();
            if roll < 0.90 {
                rng.gen_range(60..=90)
            } else if roll < 0.97 {
                rng.gen_range(121..=150)
            } else if roll < 0.99 {
                rng.gen_range(35..=44)
            } else {
                rng.gen_range(155..=190)
            }
        }
    }
}
