//! Result aggregation.
//!
//! Turns raw per-prompt answers into per-category and overall averages.
//! Averages are plain floating-point means; rounding is left to whoever
//! displays them.

use super::entities::SurveyBlueprint;
use crate::core::ids::Id;
use crate::run::entities::{Answers, is_answer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Aggregate for one category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryStat {
    /// `None` when no prompt of the category is answered.
    pub avg: Option<f64>,
    pub count: usize,
}

/// Derived, read-only snapshot of a run's results. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub answered_count: usize,
    pub total_count: usize,
    pub overall_avg: Option<f64>,
    /// One entry per declared category, including unanswered ones.
    pub by_category: BTreeMap<Id, CategoryStat>,
}

impl ResultSummary {
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.answered_count == self.total_count
    }

    /// Answered share in `[0, 1]`; zero for a blueprint without prompts.
    pub fn progress(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.answered_count as f64 / self.total_count as f64
        }
    }

    pub fn category(&self, category_id: &str) -> Option<&CategoryStat> {
        self.by_category.get(category_id)
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Compute the summary of `answers` against `survey`.
///
/// Missing and non-finite answers are skipped: they count neither as
/// answered nor toward any average. A prompt whose category is not
/// declared still counts toward the overall figures but has no
/// per-category bucket to land in.
pub fn compute_summary(survey: &SurveyBlueprint, answers: &Answers) -> ResultSummary {
    let mut overall = Accumulator::default();
    let mut buckets: HashMap<&str, Accumulator> = survey
        .categories
        .iter()
        .map(|c| (c.category_id.as_str(), Accumulator::default()))
        .collect();

    for prompt in &survey.prompts {
        let Some(&value) = answers.get(&prompt.prompt_id) else {
            continue;
        };
        if !is_answer(value) {
            continue;
        }

        overall.add(value);
        if let Some(bucket) = buckets.get_mut(prompt.category_id.as_str()) {
            bucket.add(value);
        }
    }

    let by_category = survey
        .categories
        .iter()
        .map(|c| {
            let bucket = &buckets[c.category_id.as_str()];
            (
                c.category_id.clone(),
                CategoryStat {
                    avg: bucket.avg(),
                    count: bucket.count,
                },
            )
        })
        .collect();

    ResultSummary {
        answered_count: overall.count,
        total_count: survey.prompts.len(),
        overall_avg: overall.avg(),
        by_category,
    }
}
