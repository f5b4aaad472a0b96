//! CSV upload endpoint

use axum::{body::Bytes, extract::State, Extension, Json};

use crate::db::settings;
use crate::ingest::{self, IngestError, UploadSummary};
use crate::{ApiError, ApiResult, AppState};

/// POST /api/upload (protected)
///
/// Body is the raw CSV text. Returns the upload summary; partial row
/// rejection is still a success. Only totally unreadable input (bad
/// encoding, missing header) is answered with 400.
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    body: Bytes,
) -> ApiResult<Json<UploadSummary>> {
    let thresholds = settings::load_thresholds(&state.db).await?;

    match ingest::ingest(&state.db, &thresholds, user.guid, &body).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e @ (IngestError::Format(_) | IngestError::Encoding)) => {
            Err(ApiError::BadRequest(e.to_string()))
        }
        Err(IngestError::Storage(e)) => Err(ApiError::Common(e)),
    }
}
