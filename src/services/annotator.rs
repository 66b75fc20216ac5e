// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal progress annotation.
//!
//! Decides whether a freshly created activity should be annotated, renders
//! the year-to-date progress message and writes it back to Strava. The
//! configured signature line doubles as the idempotence marker: an activity
//! whose description already contains it is never touched again.

use chrono::{DateTime, Datelike, Utc};
use validator::Validate;

use crate::db::Database;
use crate::error::Result;
use crate::models::ActivitySummary;
use crate::services::strava::StravaClient;
use crate::time_utils::days_left_in_year;

/// What `annotate` did. Everything other than `Annotated` is a benign no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationOutcome {
    Annotated,
    /// Target not among this year's cycling activities
    ActivityNotFound,
    /// Description already carries the signature
    AlreadyAnnotated,
    NotCyclingCategory,
}

/// Writes goal progress into activity descriptions.
#[derive(Clone)]
pub struct GoalAnnotator {
    client: StravaClient,
    db: Database,
    default_goal_meters: f64,
    signature: String,
}

impl GoalAnnotator {
    pub fn new(
        client: StravaClient,
        db: Database,
        default_goal_meters: f64,
        signature: String,
    ) -> Self {
        Self {
            client,
            db,
            default_goal_meters,
            signature: signature.trim().to_string(),
        }
    }

    /// Annotate `activity_id` using the year-to-date `activities` already
    /// aggregated for the athlete.
    pub async fn annotate(
        &self,
        athlete_id: u64,
        activity_id: u64,
        access_token: &str,
        activities: &[ActivitySummary],
        now: DateTime<Utc>,
    ) -> Result<AnnotationOutcome> {
        // 1. Locate the target
        let Some(target) = activities.iter().find(|a| a.id == activity_id) else {
            tracing::debug!(athlete_id, activity_id, "Activity not in year-to-date set");
            return Ok(AnnotationOutcome::ActivityNotFound);
        };

        // 2. Totals (target included)
        let total_distance: f64 = activities.iter().map(|a| a.distance).sum();
        let activity_distance = target.distance;

        // 3. Idempotence check. The listing usually omits descriptions, so
        //    fall back to the detail endpoint.
        let description = match &target.description {
            Some(d) => d.clone(),
            None => self
                .client
                .get_activity(access_token, activity_id)
                .await?
                .description
                .unwrap_or_default(),
        };

        if is_annotated(&description, &self.signature) {
            tracing::debug!(athlete_id, activity_id, "Activity already annotated");
            return Ok(AnnotationOutcome::AlreadyAnnotated);
        }

        // 4. Category check
        if !target.is_cycling() {
            tracing::debug!(
                athlete_id,
                activity_id,
                sport_type = %target.sport_type,
                "Activity is not a ride"
            );
            return Ok(AnnotationOutcome::NotCyclingCategory);
        }

        // 5. Render and write back
        let goal = self.goal_for(athlete_id).await?;
        let new_description = render_description(
            goal,
            total_distance,
            activity_distance,
            &description,
            &self.signature,
            now,
        );

        self.client
            .update_activity_description(access_token, activity_id, &new_description)
            .await?;

        tracing::info!(
            athlete_id,
            activity_id,
            total_distance,
            goal,
            "Activity annotated"
        );
        Ok(AnnotationOutcome::Annotated)
    }

    /// The athlete's goal in meters, or the configured default.
    async fn goal_for(&self, athlete_id: u64) -> Result<f64> {
        match self.db.get_goal(athlete_id).await? {
            Some(goal) if goal.validate().is_ok() => Ok(goal.goal_distance_meters),
            Some(goal) => {
                tracing::warn!(
                    athlete_id,
                    goal = goal.goal_distance_meters,
                    "Ignoring invalid stored goal"
                );
                Ok(self.default_goal_meters)
            }
            None => Ok(self.default_goal_meters),
        }
    }
}

/// Returns true if the description already carries the signature.
///
/// Compares against the trimmed signature, which is what `render` writes.
fn is_annotated(description: &str, signature: &str) -> bool {
    let signature = signature.trim();
    !signature.is_empty() && description.contains(signature)
}

/// Inputs to the description template.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionContext<'a> {
    pub description: &'a str,
    pub year: i32,
    /// Goal in meters
    pub goal: f64,
    /// Year-to-date distance in meters
    pub total_distance: f64,
    /// Percent of the goal reached so far
    pub progress: f64,
    /// Percent of the goal this activity added
    pub contributed: f64,
    /// Meters still to ride
    pub distance_left: f64,
    pub days_left: i64,
    pub signature: &'a str,
}

impl<'a> DescriptionContext<'a> {
    pub fn new(
        goal: f64,
        total_distance: f64,
        activity_distance: f64,
        description: &'a str,
        signature: &'a str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            description,
            year: now.year(),
            goal,
            total_distance,
            progress: total_distance / goal * 100.0,
            contributed: activity_distance / goal * 100.0,
            distance_left: goal - total_distance,
            days_left: days_left_in_year(now),
            signature,
        }
    }

    pub fn goal_reached(&self) -> bool {
        at_or_above(self.total_distance, self.goal)
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::with_capacity(5);

        if !self.description.is_empty() {
            lines.push(self.description.to_string());
        }

        if self.goal_reached() {
            lines.push(format!("🏆 {}% of the goal!", two_decimals(self.progress)));
            lines.push(format!(
                "{} of {} km in {}",
                km(self.total_distance),
                km(self.goal),
                self.year
            ));
            lines.push(format!("{} days remains", self.days_left));
        } else {
            lines.push(format!(
                "+{}% towards the goal!",
                two_decimals(self.contributed)
            ));
            lines.push(format!(
                "{} of {} km ({}%) in {}",
                km(self.total_distance),
                km(self.goal),
                two_decimals(self.progress),
                self.year
            ));
            lines.push(format!(
                "{} km and {} days remains",
                km(self.distance_left),
                self.days_left
            ));
        }

        lines.push(self.signature.trim().to_string());
        lines.join("\n").trim().to_string()
    }
}

/// Render the annotated description for an activity.
///
/// Pure: the same inputs and `now` always produce the same text.
pub fn render_description(
    goal: f64,
    total_distance: f64,
    activity_distance: f64,
    description: &str,
    signature: &str,
    now: DateTime<Utc>,
) -> String {
    DescriptionContext::new(
        goal,
        total_distance,
        activity_distance,
        description,
        signature,
        now,
    )
    .render()
}

fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

fn km(meters: f64) -> String {
    two_decimals(meters / 1000.0)
}

fn at_or_above(value: f64, threshold: f64) -> bool {
    value >= threshold
}
