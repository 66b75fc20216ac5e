// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX upload route, used by the ride-recording client.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{AppError, Result};
use crate::AppState;

const UPLOAD_FILE_NAME: &str = "ride_goal_activity.gpx";

/// Upload routes. Any origin may post.
pub fn routes(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::new().allow_origin(Any))
}

/// Forward a GPX file to Strava on behalf of the athlete owning `authid`.
async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Result<StatusCode> {
    let mut auth_id: Option<String> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Unprocessable(format!("Failed to parse body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("authid") => {
                auth_id = Some(field.text().await.map_err(|e| {
                    AppError::Unprocessable(format!("Failed to parse body: {}", e))
                })?);
            }
            Some("file") => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Unprocessable(format!("Failed to read file: {}", e))
                })?;
                file = Some(bytes.to_vec());
            }
            other => {
                tracing::debug!(field = ?other, "Unexpected upload field");
            }
        }
    }

    let auth_id = auth_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Forbidden("missing authid".to_string()))?;

    let athlete_id = state
        .db
        .get_upload_key(&auth_id)
        .await?
        .map(|key| key.athlete_id)
        .ok_or_else(|| AppError::Forbidden("unknown authid".to_string()))?;

    let file = file.ok_or_else(|| AppError::Unprocessable("missing file".to_string()))?;

    let access_token = state.refresher.refresh(athlete_id).await?;

    state
        .strava
        .upload_activity(&access_token, UPLOAD_FILE_NAME, file)
        .await?;

    tracing::info!(athlete_id, "Activity uploaded");
    Ok(StatusCode::OK)
}
