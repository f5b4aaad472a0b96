//! Integration tests for hw-web API endpoints
//!
//! Covers the health endpoint, session auth (register/login/logout),
//! upload, history queries, contact CRUD, simulated alerts, and
//! threshold settings. Each test runs against a fresh in-memory
//! database through `build_router`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

use hw_web::{build_router, AppState};

/// Test helper: app over a fresh in-memory database
async fn setup_app() -> Router {
    let pool = hw_common::db::init_in_memory()
        .await
        .expect("Should create in-memory database");
    build_router(AppState::new(pool))
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: register + login, returning the session cookie
async fn login(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/register",
            json!({"email": email, "password": "pw"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/login",
            json!({"email": email, "password": "pw"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set session cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

// =============================================================================
// Health and authentication
// =============================================================================

#[tokio::test]
async fn health_endpoint_no_auth_required() {
    let app = setup_app().await;

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hw-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn protected_endpoints_require_session() {
    let app = setup_app().await;

    for uri in ["/api/readings", "/api/contacts", "/api/alerts"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = app
        .clone()
        .oneshot(get("/api/readings", Some("hw_session=bogus")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = setup_app().await;
    login(&app, "dup@example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/register",
            json!({"email": "dup@example.com", "password": "other"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = setup_app().await;
    login(&app, "user@example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/login",
            json!({"email": "user@example.com", "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json("/api/logout", json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/readings", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Upload and history
// =============================================================================

fn csv_upload(uri: &str, body: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn upload_returns_summary_and_populates_history() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let csv = "timestamp,bpm\n2024-01-01T00:00:00,72\n2024-01-01T00:01:00,210\nbad,abc\n";
    let response = app
        .clone()
        .oneshot(csv_upload("/api/upload", csv, &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["accepted"], 2);
    assert_eq!(body["rejected"], 1);
    // Default thresholds: 210 is critical, 72 normal
    assert_eq!(body["counts_by_tag"]["normal"], 1);
    assert_eq!(body["counts_by_tag"]["critical"], 1);
    assert_eq!(body["alert_count"], 1);

    let response = app
        .clone()
        .oneshot(get("/api/readings", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let readings = body["readings"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["bpm"], 72);
    assert_eq!(readings[0]["tag"], "normal");

    let response = app
        .oneshot(get("/api/readings/latest", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["bpm"], 210);
    assert_eq!(body["tag"], "critical");
}

#[tokio::test]
async fn unreadable_upload_is_bad_request() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .clone()
        .oneshot(csv_upload("/api/upload", "no,usable,columns\n1,2,3\n", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn readings_range_rejects_bad_bounds() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .oneshot(get("/api/readings?from=not-a-time", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn simulate_appends_classified_reading() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json("/api/simulate", json!({"mode": "attack"}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    // attack band is 155..=190: critical under default thresholds
    assert_eq!(body["tag"], "critical");
    assert_eq!(body["stored"], true);

    let response = app
        .oneshot(get("/api/readings/latest", Some(&cookie)))
        .await
        .unwrap();
    let latest = extract_json(response.into_body()).await;
    assert_eq!(latest["bpm"], body["bpm"]);
}

// =============================================================================
// Contacts and alerts
// =============================================================================

#[tokio::test]
async fn contact_crud_round_trip() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/contacts",
            json!({"name": "Alice", "phone": "555-0100"}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    let guid = created["guid"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get("/api/contacts", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/contacts/{}", guid))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/contacts", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn nameless_contact_is_rejected() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .oneshot(post_json("/api/contacts", json!({"name": "  "}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manual_alert_requires_a_reading() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .oneshot(post_json("/api/alerts", json!({}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_alert_snapshots_contacts() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    app.clone()
        .oneshot(post_json(
            "/api/contacts",
            json!({"name": "Alice", "phone": "555-0100"}),
            Some(&cookie),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(csv_upload(
            "/api/upload",
            "timestamp,bpm\n2024-01-01T00:00:00,72\n",
            &cookie,
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/api/alerts", json!({"location": "Home"}), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let alert = extract_json(response.into_body()).await;
    assert_eq!(alert["location"], "Home");
    assert_eq!(alert["recipients"][0]["name"], "Alice");

    let response = app.oneshot(get("/api/alerts", Some(&cookie))).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Threshold settings
// =============================================================================

#[tokio::test]
async fn thresholds_get_put_round_trip() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .clone()
        .oneshot(get("/api/settings/thresholds", Some(&cookie)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["low_bpm"], 45);
    assert_eq!(body["high_bpm"], 150);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings/thresholds")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    json!({"low_bpm": 40, "elevated_bpm": 120, "high_bpm": 180}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // New thresholds govern subsequent uploads: 160 is now abnormal
    let response = app
        .clone()
        .oneshot(csv_upload(
            "/api/upload",
            "timestamp,bpm\n2024-01-01T00:00:00,160\n",
            &cookie,
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["counts_by_tag"]["abnormal"], 1);
    assert_eq!(body["alert_count"], 0);
}

#[tokio::test]
async fn misordered_thresholds_are_rejected() {
    let app = setup_app().await;
    let cookie = login(&app, "user@example.com").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings/thresholds")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    json!({"low_bpm": 150, "elevated_bpm": 120, "high_bpm": 100}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
