//! Run lifecycle rules.
//!
//! A run moves `Created → InProgress → Complete`. Completion is "every
//! prompt of the blueprint has an answer", checked against the blueprint
//! rather than the last index, since prompts may be answered out of order.
//! `completedAt` is stamped once and never overwritten.
//!
//! All operations take the run by reference and return a new value.

use super::entities::ResponseState;
use crate::core::ids::Timestamp;
use crate::survey::entities::SurveyBlueprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived state of a run against its blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No answers recorded yet.
    Created,
    /// Some, not all, prompts answered.
    InProgress,
    /// Every prompt answered.
    Complete,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Created => "created",
            RunStatus::InProgress => "in_progress",
            RunStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of blueprint prompts with an answer.
pub fn answered_count(run: &ResponseState, survey: &SurveyBlueprint) -> usize {
    survey
        .prompt_ids()
        .filter(|id| run.has_answer(id))
        .count()
}

/// True iff every prompt of the blueprint has an answer.
///
/// A blueprint without prompts is never complete.
pub fn is_complete(run: &ResponseState, survey: &SurveyBlueprint) -> bool {
    !survey.prompts.is_empty() && survey.prompt_ids().all(|id| run.has_answer(id))
}

/// Index (in blueprint order) of the first prompt without an answer.
pub fn first_unanswered(run: &ResponseState, survey: &SurveyBlueprint) -> Option<usize> {
    survey.prompt_ids().position(|id| !run.has_answer(id))
}

pub fn status(run: &ResponseState, survey: &SurveyBlueprint) -> RunStatus {
    if is_complete(run, survey) {
        RunStatus::Complete
    } else if answered_count(run, survey) == 0 {
        RunStatus::Created
    } else {
        RunStatus::InProgress
    }
}

/// Return a copy of `run` with `answers[prompt_id] = value`.
///
/// Completion is not stamped here; see [`complete_if_done`].
pub fn record_answer(run: &ResponseState, prompt_id: &str, value: f64) -> ResponseState {
    let mut next = run.clone();
    next.answers.insert(prompt_id.to_string(), value);
    next
}

/// Stamp `completedAt` if the run is complete and not stamped yet.
pub fn complete_if_done(
    run: ResponseState,
    survey: &SurveyBlueprint,
    now: Timestamp,
) -> ResponseState {
    if run.completed_at.is_none() && is_complete(&run, survey) {
        finish(run, now)
    } else {
        run
    }
}

/// Mark the run finished. Idempotent: an existing `completedAt` is kept.
pub fn finish(mut run: ResponseState, now: Timestamp) -> ResponseState {
    if run.completed_at.is_none() {
        run.completed_at = Some(now);
    }
    run
}
