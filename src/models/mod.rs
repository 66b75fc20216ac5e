// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod goal;

pub use activity::{is_cycling, ActivitySummary, CYCLING_SPORT_TYPES};
pub use credential::{StoredCredential, UploadKey, UserCredential};
pub use goal::GoalSetting;
