// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: app construction and a fake Strava API.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use ride_goal::config::Config;
use ride_goal::db::Database;
use ride_goal::models::UserCredential;
use ride_goal::routes::create_router;
use ride_goal::services::CredentialStore;
use ride_goal::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_SIGNATURE: &str = "-- ride-goal test";
/// Authorization code the fake accepts, for athlete `REGISTERED_ATHLETE`.
pub const GOOD_CODE: &str = "good-code";
pub const REGISTERED_ATHLETE: u64 = 4242;

/// Create a test app with offline dependencies (in-memory store, real
/// Strava URLs that are never reached).
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::default())
}

pub fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(config, Database::new_in_memory()).expect("Failed to build app state"),
    );
    (create_router(state.clone()), state)
}

/// Build an activity listing entry.
pub fn activity(id: u64, sport_type: &str, distance: f64) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {}", id),
        "sport_type": sport_type,
        "distance": distance,
    })
}

pub fn ride(id: u64, distance: f64) -> Value {
    activity(id, "Ride", distance)
}

/// State behind the fake Strava API.
#[derive(Default)]
pub struct FakeState {
    /// Valid refresh tokens -> athlete. Each token works exactly once.
    refresh_tokens: Mutex<HashMap<String, u64>>,
    issued: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    /// Refresh requests currently in flight
    in_flight_refreshes: AtomicUsize,
    pub max_concurrent_refreshes: AtomicUsize,
    /// Delay applied to every refresh, to widen race windows
    refresh_delay_ms: AtomicUsize,
    /// Force every refresh to fail with this status
    refresh_status: Mutex<Option<u16>>,

    activities: Mutex<Vec<Value>>,
    /// Current description per activity (detail endpoint + updates)
    descriptions: Mutex<HashMap<u64, String>>,
    pub pages_requested: Mutex<Vec<u32>>,
    pub after_params: Mutex<Vec<i64>>,
    fail_page: Mutex<Option<u32>>,

    pub updates: Mutex<Vec<(u64, String)>>,
    pub uploads: AtomicUsize,
}

/// A fake Strava API listening on an ephemeral local port.
pub struct FakeStrava {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
}

impl FakeStrava {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());

        let app = Router::new()
            .route("/oauth/token", post(token))
            .route("/api/v3/athlete/activities", get(list_activities))
            .route(
                "/api/v3/activities/{id}",
                get(get_activity).put(update_activity),
            )
            .route("/api/v3/uploads", post(upload))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Strava");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// App configuration pointing at this fake.
    pub fn config(&self) -> Config {
        Config {
            strava_api_url: format!("http://{}/api/v3", self.addr),
            strava_oauth_url: format!("http://{}/oauth/token", self.addr),
            strava_page_size: 2,
            http_timeout_secs: 5,
            default_goal_meters: 1_000_000.0,
            annotation_signature: TEST_SIGNATURE.to_string(),
            ..Config::default()
        }
    }

    /// Mint a refresh token the fake will accept once for `athlete_id`.
    pub fn issue_refresh_token(&self, athlete_id: u64) -> String {
        let n = self.state.issued.fetch_add(1, Ordering::SeqCst);
        let token = format!("refresh-{}-{}", athlete_id, n);
        self.state
            .refresh_tokens
            .lock()
            .unwrap()
            .insert(token.clone(), athlete_id);
        token
    }

    /// Store a registered credential for `athlete_id` whose refresh token
    /// the fake accepts.
    pub async fn register(&self, state: &AppState, athlete_id: u64) {
        let refresh_token = self.issue_refresh_token(athlete_id);
        let credential = UserCredential::from_exchange(
            athlete_id,
            "stale-access".to_string(),
            refresh_token,
            0,
        );
        CredentialStore::new(state.db.clone())
            .put(&credential)
            .await
            .unwrap();
    }

    pub fn set_activities(&self, activities: Vec<Value>) {
        *self.state.activities.lock().unwrap() = activities;
    }

    pub fn set_description(&self, activity_id: u64, description: &str) {
        self.state
            .descriptions
            .lock()
            .unwrap()
            .insert(activity_id, description.to_string());
    }

    pub fn fail_page(&self, page: u32) {
        *self.state.fail_page.lock().unwrap() = Some(page);
    }

    pub fn fail_refreshes_with(&self, status: u16) {
        *self.state.refresh_status.lock().unwrap() = Some(status);
    }

    pub fn slow_refreshes(&self, delay: Duration) {
        self.state
            .refresh_delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.state.pages_requested.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(u64, String)> {
        self.state.updates.lock().unwrap().clone()
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` description updates arrived.
    pub async fn wait_for_updates(&self, count: usize) -> Vec<(u64, String)> {
        for _ in 0..200 {
            let updates = self.updates();
            if updates.len() >= count {
                return updates;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.updates()
    }
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h.starts_with("Bearer access-"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Authorization Error"})),
    )
        .into_response()
}

async fn token(
    State(state): State<Arc<FakeState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let athlete_id = match form.get("grant_type").map(String::as_str) {
        Some("refresh_token") => {
            state.refresh_calls.fetch_add(1, Ordering::SeqCst);
            let in_flight = state.in_flight_refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            state
                .max_concurrent_refreshes
                .fetch_max(in_flight, Ordering::SeqCst);

            let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            }
            state.in_flight_refreshes.fetch_sub(1, Ordering::SeqCst);

            if let Some(status) = *state.refresh_status.lock().unwrap() {
                return (
                    StatusCode::from_u16(status).unwrap(),
                    Json(json!({"message": "forced failure"})),
                )
                    .into_response();
            }

            let presented = form.get("refresh_token").cloned().unwrap_or_default();
            match state.refresh_tokens.lock().unwrap().remove(&presented) {
                Some(athlete_id) => athlete_id,
                None => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "message": "Bad Request",
                            "errors": [{"resource": "RefreshToken", "code": "invalid_grant"}]
                        })),
                    )
                        .into_response()
                }
            }
        }
        Some("authorization_code") if form.get("code").map(String::as_str) == Some(GOOD_CODE) => {
            REGISTERED_ATHLETE
        }
        _ => return (StatusCode::BAD_REQUEST, Json(json!({"message": "Bad Request"}))).into_response(),
    };

    let n = state.issued.fetch_add(1, Ordering::SeqCst);
    let refresh_token = format!("refresh-{}-{}", athlete_id, n);
    state
        .refresh_tokens
        .lock()
        .unwrap()
        .insert(refresh_token.clone(), athlete_id);

    Json(json!({
        "token_type": "Bearer",
        "access_token": format!("access-{}-{}", athlete_id, n),
        "refresh_token": refresh_token,
        "expires_at": chrono::Utc::now().timestamp() + 6 * 3600,
        "expires_in": 6 * 3600,
        "athlete": {"id": athlete_id, "firstname": "Test"},
    }))
    .into_response()
}

async fn list_activities(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }

    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(30);
    let after: i64 = params.get("after").and_then(|p| p.parse().ok()).unwrap_or(0);

    state.pages_requested.lock().unwrap().push(page);
    state.after_params.lock().unwrap().push(after);

    if *state.fail_page.lock().unwrap() == Some(page) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }

    let activities = state.activities.lock().unwrap();
    let start = (page.saturating_sub(1) as usize) * per_page;
    let items: Vec<Value> = activities.iter().skip(start).take(per_page).cloned().collect();
    Json(items).into_response()
}

async fn get_activity(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }

    let description = state.descriptions.lock().unwrap().get(&id).cloned();
    Json(json!({"id": id, "description": description})).into_response()
}

async fn update_activity(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }

    let description = body["description"].as_str().unwrap_or_default().to_string();
    state
        .descriptions
        .lock()
        .unwrap()
        .insert(id, description.clone());
    state.updates.lock().unwrap().push((id, description));
    Json(json!({"id": id})).into_response()
}

async fn upload(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }

    let mut has_file = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            has_file = true;
        }
    }
    if !has_file {
        return (StatusCode::BAD_REQUEST, "no file").into_response();
    }

    state.uploads.fetch_add(1, Ordering::SeqCst);
    (StatusCode::CREATED, Json(json!({"id": 1, "status": "queued"}))).into_response()
}
