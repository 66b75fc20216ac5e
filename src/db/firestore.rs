// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Credentials (OAuth tokens per athlete)
//! - Goals (yearly distance goal per athlete)
//! - Upload keys (opaque key -> athlete)
//!
//! Every record is a single document keyed by ID, so each write is atomic and
//! concurrent writes to the same key resolve as last-write-wins. The in-memory
//! backend honours the same contract for local development and tests.

use std::sync::Arc;

use dashmap::DashMap;
use validator::Validate;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{GoalSetting, StoredCredential, UploadKey};

/// Database handle, cheap to clone.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<MemoryStore>),
}

/// Process-local storage used when no GCP project is configured.
#[derive(Default)]
struct MemoryStore {
    credentials: DashMap<u64, StoredCredential>,
    goals: DashMap<u64, GoalSetting>,
    upload_keys: DashMap<String, UploadKey>,
}

impl Database {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory database. Contents are lost on restart.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    // ─── Credential Operations ───────────────────────────────────

    /// Get the stored credential for an athlete.
    pub async fn get_credential(
        &self,
        athlete_id: u64,
    ) -> Result<Option<StoredCredential>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::CREDENTIALS)
                .obj()
                .one(&athlete_id.to_string())
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store
                .credentials
                .get(&athlete_id)
                .map(|entry| entry.value().clone())),
        }
    }

    /// Create or replace the credential for an athlete.
    pub async fn set_credential(&self, credential: &StoredCredential) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: StoredCredential = client
                    .fluent()
                    .update()
                    .in_col(collections::CREDENTIALS)
                    .document_id(credential.athlete_id.to_string())
                    .object(credential)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                store
                    .credentials
                    .insert(credential.athlete_id, credential.clone());
            }
        }
        Ok(())
    }

    // ─── Goal Operations ─────────────────────────────────────────

    /// Get an athlete's goal setting, if one was set.
    pub async fn get_goal(&self, athlete_id: u64) -> Result<Option<GoalSetting>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::GOALS)
                .obj()
                .one(&athlete_id.to_string())
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store
                .goals
                .get(&athlete_id)
                .map(|entry| entry.value().clone())),
        }
    }

    /// Store an athlete's goal setting. Non-positive goals are rejected.
    pub async fn set_goal(&self, goal: &GoalSetting) -> Result<(), AppError> {
        goal.validate()
            .map_err(|e| AppError::BadRequest(format!("Invalid goal: {}", e)))?;

        match &self.backend {
            Backend::Firestore(client) => {
                let _: GoalSetting = client
                    .fluent()
                    .update()
                    .in_col(collections::GOALS)
                    .document_id(goal.athlete_id.to_string())
                    .object(goal)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                store.goals.insert(goal.athlete_id, goal.clone());
            }
        }
        Ok(())
    }

    // ─── Upload Key Operations ───────────────────────────────────

    /// Resolve an upload key to its athlete.
    pub async fn get_upload_key(&self, key: &str) -> Result<Option<UploadKey>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::UPLOAD_KEYS)
                .obj()
                .one(key)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(store) => Ok(store.upload_keys.get(key).map(|e| e.value().clone())),
        }
    }

    /// Store a freshly minted upload key.
    pub async fn set_upload_key(&self, key: &str, upload_key: &UploadKey) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: UploadKey = client
                    .fluent()
                    .update()
                    .in_col(collections::UPLOAD_KEYS)
                    .document_id(key)
                    .object(upload_key)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(store) => {
                store
                    .upload_keys
                    .insert(key.to_string(), upload_key.clone());
            }
        }
        Ok(())
    }
}
