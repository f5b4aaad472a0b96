//! Account registration, login, and session middleware
//!
//! Login issues an opaque session token delivered as an HttpOnly
//! cookie; the middleware resolves the cookie to a [`CurrentUser`]
//! for protected handlers. This is demo-grade session auth, not a
//! hardened login system.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{sessions, settings, users};
use crate::{ApiError, ApiResult, AppState};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "hw_session";

/// Authenticated user attached to protected requests
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub guid: Uuid,
    pub email: String,
}

/// Extract the session token from a Cookie header, if present
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Session middleware for protected routes
///
/// Resolves the session cookie to a user and stores it in request
/// extensions. Returns 401 when the cookie is missing, unknown, or
/// expired. Health and register/login do NOT use this middleware.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("login required".to_string()))?;

    let user = sessions::lookup_valid(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("session expired or unknown".to_string()))?;

    request.extensions_mut().insert(CurrentUser {
        guid: user.guid,
        email: user.email,
    });

    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub guid: Uuid,
    pub email: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    if users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict(
            "this email is already registered".to_string(),
        ));
    }

    let password_hash = hw_common::auth::hash_password(&payload.password);
    let user = users::create(&state.db, &email, &password_hash).await?;

    tracing::info!(user = %user.guid, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            guid: user.guid,
            email: user.email,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub guid: Uuid,
    pub email: String,
}

/// POST /api/login
///
/// On success sets the session cookie. The same "invalid email or
/// password" answer covers both unknown accounts and bad passwords.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<Response> {
    let email = payload.email.trim().to_lowercase();

    let user = users::find_by_email(&state.db, &email)
        .await?
        .filter(|u| hw_common::auth::verify_password(&payload.password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    let ttl = settings::session_ttl_minutes(&state.db).await?;
    let token = sessions::create(&state.db, user.guid, ttl).await?;

    tracing::info!(user = %user.guid, "Logged in");

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl * 60
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            guid: user.guid,
            email: user.email,
        }),
    )
        .into_response())
}

/// POST /api/logout (protected)
///
/// Deletes the session and expires the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    if let Some(token) = session_token(&headers) {
        sessions::delete(&state.db, &token).await?;
    }

    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response())
}
