// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Year-to-date activity aggregation.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::ActivitySummary;
use crate::services::strava::StravaClient;
use crate::time_utils::start_of_year;

/// Pages through the athlete's activity list for the current calendar year.
#[derive(Clone)]
pub struct ActivityAggregator {
    client: StravaClient,
    per_page: u32,
}

impl ActivityAggregator {
    pub fn new(client: StravaClient, per_page: u32) -> Self {
        Self { client, per_page }
    }

    /// Fetch every cycling activity created since January 1 (UTC) of `now`'s year.
    ///
    /// Requests pages 1, 2, ... until one comes back empty; no count header is
    /// trusted. Non-cycling activities keep pagination going but are dropped
    /// from the result. Any page failure aborts the whole aggregation.
    pub async fn fetch_year_to_date(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivitySummary>> {
        let after = start_of_year(now).timestamp();
        let mut retained = Vec::new();
        let mut seen = 0usize;
        let mut page = 1u32;

        loop {
            let activities = self
                .client
                .list_activities(access_token, after, page, self.per_page)
                .await
                .inspect_err(|e| {
                    tracing::warn!(page, error = %e, "Failed to fetch activity page");
                })?;

            if activities.is_empty() {
                break;
            }

            seen += activities.len();
            retained.extend(activities.into_iter().filter(ActivitySummary::is_cycling));
            page += 1;
        }

        tracing::debug!(
            pages = page - 1,
            seen,
            retained = retained.len(),
            "Year-to-date activities aggregated"
        );
        Ok(retained)
    }
}
