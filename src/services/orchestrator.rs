// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook-driven annotation pipeline.
//!
//! Handles the core workflow for one new activity:
//! 1. Refresh the athlete's access token
//! 2. Aggregate this year's cycling activities
//! 3. Annotate the new activity with goal progress

use chrono::Utc;
use tracing::Instrument;

use crate::error::Result;
use crate::services::aggregator::ActivityAggregator;
use crate::services::annotator::{AnnotationOutcome, GoalAnnotator};
use crate::services::locks::KeyedLocks;
use crate::services::token::TokenRefresher;

/// Runs refresh → aggregate → annotate for webhook events.
#[derive(Clone)]
pub struct Orchestrator {
    refresher: TokenRefresher,
    aggregator: ActivityAggregator,
    annotator: GoalAnnotator,
    /// One pipeline run per athlete at a time, so duplicate deliveries cannot
    /// both pass the signature check before either writes.
    pipeline_locks: KeyedLocks,
}

impl Orchestrator {
    pub fn new(
        refresher: TokenRefresher,
        aggregator: ActivityAggregator,
        annotator: GoalAnnotator,
    ) -> Self {
        Self {
            refresher,
            aggregator,
            annotator,
            pipeline_locks: KeyedLocks::new(),
        }
    }

    /// Spawn a detached pipeline run and return immediately.
    ///
    /// Nothing is handed back to the caller: outcomes and errors only show up
    /// in the logs. Runs in flight at shutdown are abandoned.
    pub fn dispatch(&self, athlete_id: u64, activity_id: u64) {
        let orchestrator = self.clone();
        let span = tracing::info_span!("annotate_activity", athlete_id, activity_id);

        tokio::spawn(
            async move {
                match orchestrator.run(athlete_id, activity_id).await {
                    Ok(AnnotationOutcome::Annotated) => {}
                    Ok(outcome) => {
                        tracing::debug!(?outcome, "Pipeline finished without annotating");
                    }
                    Err(e) if e.is_strava_token_error() => {
                        tracing::warn!(
                            error = %e,
                            "Strava rejected the credential; athlete must reconnect"
                        );
                    }
                    Err(e) if e.is_rate_limited() => {
                        tracing::warn!(error = %e, "Strava rate limit hit; event dropped");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Annotation pipeline failed");
                    }
                }
            }
            .instrument(span),
        );
    }

    /// Run the pipeline to completion.
    pub async fn run(&self, athlete_id: u64, activity_id: u64) -> Result<AnnotationOutcome> {
        let _guard = self.pipeline_locks.lock(athlete_id).await;

        let access_token = self.refresher.refresh(athlete_id).await?;

        let now = Utc::now();
        let activities = self
            .aggregator
            .fetch_year_to_date(&access_token, now)
            .await?;

        self.annotator
            .annotate(athlete_id, activity_id, &access_token, &activities, now)
            .await
    }
}
