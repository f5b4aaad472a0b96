//! hw-web library - HeartWatch web service
//!
//! Demo heart-rate monitoring application: user accounts, CSV upload
//! of heart-rate samples, rule-based abnormality detection, and
//! simulated emergency-alert records.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod error;
pub mod ingest;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// Health, register, and login are public; everything else sits
/// behind the session middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    // Protected routes (require a valid session cookie)
    let protected = Router::new()
        .route("/api/logout", post(api::auth::logout))
        .route("/api/upload", post(api::upload::upload))
        .route("/api/simulate", post(api::readings::simulate))
        .route("/api/readings", get(api::readings::list_readings))
        .route("/api/readings/latest", get(api::readings::latest_reading))
        .route(
            "/api/contacts",
            get(api::contacts::list_contacts).post(api::contacts::add_contact),
        )
        .route("/api/contacts/:guid", delete(api::contacts::delete_contact))
        .route(
            "/api/alerts",
            get(api::alerts::list_alerts).post(api::alerts::trigger_alert),
        )
        .route(
            "/api/settings/thresholds",
            get(api::settings::get_thresholds).put(api::settings::put_thresholds),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::session_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/register", post(api::auth::register))
        .route("/api/login", post(api::auth::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
