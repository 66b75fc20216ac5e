// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent OAuth credential storage.

use chrono::Utc;

use crate::db::Database;
use crate::error::Result;
use crate::models::{StoredCredential, UserCredential};

/// Authoritative store of per-athlete credentials. No expiry or eviction.
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load an athlete's credential, `None` if they never registered.
    pub async fn get(&self, athlete_id: u64) -> Result<Option<UserCredential>> {
        self.db
            .get_credential(athlete_id)
            .await?
            .map(UserCredential::try_from)
            .transpose()
    }

    /// Persist a credential, replacing any previous one for the athlete.
    pub async fn put(&self, credential: &UserCredential) -> Result<()> {
        let stored = StoredCredential::from_credential(credential, Utc::now());
        self.db.set_credential(&stored).await?;
        tracing::debug!(athlete_id = credential.athlete_id, "Credential stored");
        Ok(())
    }
}
