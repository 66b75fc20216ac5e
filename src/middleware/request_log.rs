// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request logging with a short random request ID.

use axum::{extract::Request, middleware::Next, response::Response};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use std::time::Instant;
use tracing::Instrument;

/// Random bytes in a request ID.
const REQUEST_ID_BYTES: usize = 5;

/// Log method, URI, status and elapsed time inside a span tagged with a
/// request ID, so every event emitted by the handler carries the same ID.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = request_id();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri(),
    );

    async move {
        let start = Instant::now();
        tracing::info!("Request started");

        let response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Request finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Short URL-safe request ID. Falls back to a fixed marker if the system RNG
/// is unavailable; IDs are for log correlation only.
fn request_id() -> String {
    let mut bytes = [0u8; REQUEST_ID_BYTES];
    match SystemRandom::new().fill(&mut bytes) {
        Ok(()) => URL_SAFE_NO_PAD.encode(bytes),
        Err(_) => "-".to_string(),
    }
}
