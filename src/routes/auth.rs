// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth registration routes.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::UploadKey;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// Random bytes in an upload key.
const UPLOAD_KEY_BYTES: usize = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connect", get(connect))
        .route("/register", get(register))
        .route("/register/success", get(register_success))
}

/// Start OAuth flow - redirect to Strava authorization.
async fn connect(State(state): State<Arc<AppState>>) -> Redirect {
    let auth_url = authorize_url(&state.config);

    tracing::info!(
        client_id = %state.config.strava_client_id,
        "Starting OAuth flow, redirecting to Strava"
    );

    Redirect::temporary(&auth_url)
}

/// Build the Strava authorization URL that sends the athlete back to `/register`.
pub fn authorize_url(config: &crate::config::Config) -> String {
    let callback_url = format!("https://{}/register", config.public_domain);

    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
        config.strava_authorize_url,
        urlencoding::encode(&config.strava_client_id),
        urlencoding::encode(&callback_url),
        urlencoding::encode("activity:read_all,activity:write"),
    )
}

#[derive(Deserialize)]
pub struct RegisterParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens and mint an upload key.
///
/// Strava sends `error=access_denied` when the athlete declines, otherwise
/// `code` and `scope`.
async fn register(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RegisterParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(format!("Error from Strava: {}", error)));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Code not found".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let credential = state.refresher.register(&code).await?;

    let key = generate_upload_key()?;
    state
        .db
        .set_upload_key(
            &key,
            &UploadKey {
                athlete_id: credential.athlete_id,
                created_at: format_utc_rfc3339(chrono::Utc::now()),
            },
        )
        .await?;

    tracing::info!(athlete_id = credential.athlete_id, "Registration complete");

    let redirect = format!(
        "https://{}/register/success?authid={}",
        state.config.public_domain,
        urlencoding::encode(&key)
    );
    Ok((StatusCode::FOUND, [(header::LOCATION, redirect)]).into_response())
}

async fn register_success() -> String {
    format!("Another Triumph\n{}", super::version_banner())
}

/// Generate a random URL-safe upload key.
pub fn generate_upload_key() -> Result<String> {
    let mut bytes = [0u8; UPLOAD_KEY_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
