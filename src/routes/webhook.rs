// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Strava events.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Webhook routes. Methods other than GET and POST get 405.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", get(verify).post(handle_event))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: String,
    #[serde(rename = "hub.challenge")]
    challenge: String,
    #[serde(rename = "hub.verify_token")]
    verify_token: String,
}

/// Verification response.
#[derive(Serialize)]
pub struct VerifyResponse {
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// Verify webhook subscription (GET).
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<Json<VerifyResponse>> {
    verify_subscription(params, &state.config.webhook_verify_token).map(Json)
}

/// Check a subscription handshake and echo the challenge.
///
/// The token is checked before the mode, so a caller without the shared
/// secret learns nothing else about the endpoint.
pub fn verify_subscription(params: VerifyParams, expected_token: &str) -> Result<VerifyResponse> {
    let token_matches: bool = params
        .verify_token
        .as_bytes()
        .ct_eq(expected_token.as_bytes())
        .into();

    if !token_matches {
        tracing::warn!("Webhook verification failed: invalid token");
        return Err(AppError::Forbidden("invalid verify token".to_string()));
    }

    if params.mode != "subscribe" {
        tracing::warn!(mode = %params.mode, "Webhook verification failed: unexpected mode");
        return Err(AppError::BadRequest(format!(
            "unexpected hub.mode: {}",
            params.mode
        )));
    }

    tracing::info!("Webhook subscription verified");
    Ok(VerifyResponse {
        challenge: params.challenge,
    })
}

/// Strava webhook event payload.
#[derive(Deserialize, Debug)]
struct WebhookEvent {
    object_type: String, // "activity" or "athlete"
    object_id: u64,
    aspect_type: String, // "create", "update", "delete"
    owner_id: u64,
}

impl WebhookEvent {
    /// Activity creations and updates go through the pipeline; deletions and
    /// athlete events do not.
    fn should_annotate(&self) -> bool {
        self.object_type == "activity" && self.aspect_type != "delete"
    }
}

/// Handle incoming webhook events (POST).
///
/// Responds as soon as the event parses. The pipeline runs detached, so its
/// outcome never reaches Strava.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode> {
    // Any content type; every parse failure is a BadRequest.
    let event: WebhookEvent = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse webhook event");
        AppError::BadRequest(format!("invalid webhook event: {}", e))
    })?;

    tracing::info!(
        object_type = %event.object_type,
        object_id = event.object_id,
        aspect_type = %event.aspect_type,
        owner_id = event.owner_id,
        "Webhook event received"
    );

    if event.should_annotate() {
        state.orchestrator.dispatch(event.owner_id, event.object_id);
    } else {
        tracing::debug!(
            object_type = %event.object_type,
            aspect_type = %event.aspect_type,
            "Ignoring event"
        );
    }

    // Always return 200 OK quickly (Strava requirement)
    Ok(StatusCode::OK)
}
