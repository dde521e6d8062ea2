//! Run entities

use super::focus::FocusState;
use crate::core::ids::{Id, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Answers keyed by prompt id.
pub type Answers = BTreeMap<Id, f64>;

/// True if `value` counts as a recorded answer.
pub fn is_answer(value: f64) -> bool {
    value.is_finite()
}

/// A user's in-progress or completed attempt at one blueprint (Entity).
///
/// Every write replaces the whole value; there is no partial-field update.
/// The run references its blueprint by id only and is not re-validated
/// when that blueprint is edited later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseState {
    pub run_id: Id,
    pub survey_id: Id,
    pub started_at: Timestamp,
    /// Set exactly once, when every prompt has an answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "numeric_answers")]
    pub answers: Answers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusState>,
}

impl ResponseState {
    /// A fresh run with no answers.
    pub fn start(run_id: impl Into<Id>, survey_id: impl Into<Id>, started_at: Timestamp) -> Self {
        Self {
            run_id: run_id.into(),
            survey_id: survey_id.into(),
            started_at,
            completed_at: None,
            answers: Answers::new(),
            focus: None,
        }
    }

    /// Recorded answer for a prompt, if any.
    pub fn answer(&self, prompt_id: &str) -> Option<f64> {
        self.answers.get(prompt_id).copied().filter(|v| is_answer(*v))
    }

    pub fn has_answer(&self, prompt_id: &str) -> bool {
        self.answer(prompt_id).is_some()
    }

    /// Whether completion has been stamped.
    pub fn is_finished(&self) -> bool {
        self.completed_at.is_some()
    }
}

// Stored answer maps may carry junk (strings, nulls) from older writers;
// keep only the numeric entries.
fn numeric_answers<'de, D>(deserializer: D) -> Result<Answers, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<Id, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.as_f64().map(|n| (k, n)))
        .collect())
}
