//! Database layer (Firestore, with an in-memory fallback).

pub mod firestore;

pub use firestore::Database;

/// Collection names as constants.
pub mod collections {
    pub const CREDENTIALS: &str = "credentials";
    pub const GOALS: &str = "goals";
    /// Upload keys (keyed by the key itself)
    pub const UPLOAD_KEYS: &str = "upload_keys";
}
