// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token lifecycle: registration and on-demand refresh.

use crate::error::{AppError, Result};
use crate::models::UserCredential;
use crate::services::credentials::CredentialStore;
use crate::services::locks::KeyedLocks;
use crate::services::strava::StravaClient;

/// Obtains fresh access tokens from Strava and keeps the store current.
///
/// Refresh tokens are single-use at Strava, so refreshes for one athlete are
/// serialized: a caller that waited on the lock re-reads the credential,
/// which by then holds the rotated refresh token, and refreshes again.
#[derive(Clone)]
pub struct TokenRefresher {
    client: StravaClient,
    store: CredentialStore,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: KeyedLocks,
}

impl TokenRefresher {
    pub fn new(client: StravaClient, store: CredentialStore, refresh_locks: KeyedLocks) -> Self {
        Self {
            client,
            store,
            refresh_locks,
        }
    }

    /// Get a fresh access token for the athlete.
    ///
    /// Always exchanges the refresh token with Strava; the stored `expires_at`
    /// is not trusted to skip the call.
    pub async fn refresh(&self, athlete_id: u64) -> Result<String> {
        let _guard = self.refresh_locks.lock(athlete_id).await;

        let credential = self
            .store
            .get(athlete_id)
            .await?
            .ok_or(AppError::UserNotRegistered(athlete_id))?;

        let response = match self.client.refresh_token(&credential.refresh_token).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(athlete_id, error = %e, "Token refresh failed");
                return Err(e);
            }
        };

        let refreshed = UserCredential::from_exchange(
            athlete_id,
            response.access_token,
            response.refresh_token,
            response.expires_at,
        );

        self.store.put(&refreshed).await?;

        tracing::info!(
            athlete_id,
            expires_at = %refreshed.expires_at,
            "Token refreshed"
        );
        Ok(refreshed.access_token)
    }

    /// Complete registration: exchange the authorization code and store the
    /// athlete's first credential.
    pub async fn register(&self, code: &str) -> Result<UserCredential> {
        let response = self.client.exchange_code(code).await?;
        let athlete_id = response.athlete.id;

        let _guard = self.refresh_locks.lock(athlete_id).await;

        let credential = UserCredential::from_exchange(
            athlete_id,
            response.access_token,
            response.refresh_token,
            response.expires_at,
        );
        self.store.put(&credential).await?;

        tracing::info!(
            athlete_id,
            firstname = response.athlete.firstname.as_deref().unwrap_or(""),
            "Athlete registered"
        );
        Ok(credential)
    }
}
