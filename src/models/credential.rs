// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credential model for storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::time_utils::format_utc_rfc3339;

/// A user's Strava OAuth credential.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCredential {
    /// Strava athlete ID
    pub athlete_id: u64,
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires. Strava stays authoritative.
    pub expires_at: DateTime<Utc>,
}

impl UserCredential {
    /// Build a credential from the `expires_at` Unix timestamp Strava returns.
    pub fn from_exchange(
        athlete_id: u64,
        access_token: String,
        refresh_token: String,
        expires_at: i64,
    ) -> Self {
        Self {
            athlete_id,
            access_token,
            refresh_token,
            expires_at: DateTime::from_timestamp(expires_at, 0).unwrap_or_default(),
        }
    }
}

/// Credential document stored in Firestore (keyed by athlete ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub athlete_id: u64,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (RFC 3339)
    pub expires_at: String,
    /// Last write (RFC 3339)
    pub updated_at: String,
}

impl StoredCredential {
    pub fn from_credential(credential: &UserCredential, now: DateTime<Utc>) -> Self {
        Self {
            athlete_id: credential.athlete_id,
            access_token: credential.access_token.clone(),
            refresh_token: credential.refresh_token.clone(),
            expires_at: format_utc_rfc3339(credential.expires_at),
            updated_at: format_utc_rfc3339(now),
        }
    }
}

impl TryFrom<StoredCredential> for UserCredential {
    type Error = AppError;

    fn try_from(stored: StoredCredential) -> Result<Self, Self::Error> {
        let expires_at = DateTime::parse_from_rfc3339(&stored.expires_at)
            .map_err(|e| AppError::Database(format!("Failed to parse expiry: {}", e)))?
            .with_timezone(&Utc);

        Ok(Self {
            athlete_id: stored.athlete_id,
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            expires_at,
        })
    }
}

/// Upload key document, stored under the key itself.
///
/// Minted at registration and handed to the user's upload client in place of
/// the athlete ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadKey {
    pub athlete_id: u64,
    /// When the key was minted (RFC 3339)
    pub created_at: String,
}
