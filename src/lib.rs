// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! ride-goal: Strava yearly cycling goal tracker
//!
//! Receives Strava activity webhooks and annotates each new ride with the
//! athlete's year-to-date progress toward their distance goal.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use error::Result;
use services::{
    ActivityAggregator, CredentialStore, GoalAnnotator, KeyedLocks, Orchestrator, StravaClient,
    TokenRefresher,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub strava: StravaClient,
    pub refresher: TokenRefresher,
    pub orchestrator: Orchestrator,
}

impl AppState {
    /// Wire up every service over the given database.
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let strava = StravaClient::new(&config)?;
        let credentials = CredentialStore::new(db.clone());
        let refresher = TokenRefresher::new(strava.clone(), credentials, KeyedLocks::new());
        let aggregator = ActivityAggregator::new(strava.clone(), config.strava_page_size);
        let annotator = GoalAnnotator::new(
            strava.clone(),
            db.clone(),
            config.default_goal_meters,
            config.annotation_signature.clone(),
        );
        let orchestrator = Orchestrator::new(refresher.clone(), aggregator, annotator);

        Ok(Self {
            config,
            db,
            strava,
            refresher,
            orchestrator,
        })
    }
}
