//! Emergency contact endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use hw_common::db::models::EmergencyContact;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::contacts;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/contacts (protected)
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
) -> ApiResult<Json<Vec<EmergencyContact>>> {
    Ok(Json(contacts::list(&state.db, user.guid).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddContactRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// POST /api/contacts (protected)
pub async fn add_contact(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    Json(payload): Json<AddContactRequest>,
) -> ApiResult<(StatusCode, Json<EmergencyContact>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("contact name is required".to_string()));
    }

    let contact = contacts::add(
        &state.db,
        user.guid,
        name,
        payload.phone.as_deref().filter(|p| !p.trim().is_empty()),
        payload.email.as_deref().filter(|e| !e.trim().is_empty()),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}

/// DELETE /api/contacts/:guid (protected)
///
/// Scoped to the logged-in user: deleting someone else's contact
/// answers 404, not 403, to avoid leaking guids.
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<super::CurrentUser>,
    Path(contact_guid): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = contacts::delete(&state.db, user.guid, contact_guid).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("contact {}", contact_guid)));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
