// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod annotator;
pub mod credentials;
pub mod locks;
pub mod orchestrator;
pub mod strava;
pub mod token;

pub use aggregator::ActivityAggregator;
pub use annotator::{render_description, AnnotationOutcome, DescriptionContext, GoalAnnotator};
pub use credentials::CredentialStore;
pub use locks::{KeyedGuard, KeyedLocks};
pub use orchestrator::Orchestrator;
pub use strava::StravaClient;
pub use token::TokenRefresher;
