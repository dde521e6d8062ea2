//! Survey behaviour parameters: use case knobs.
//!
//! [`SurveyBehavior`] carries the settings that shape how runs and
//! blueprints are handled by the use cases (focus limits, seeding). These
//! are application concerns; the domain only supplies the defaults.

use selfcheck_domain::{DEFAULT_BUDGET, DEFAULT_RANK_LIMIT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyBehavior {
    /// Point budget handed to a fresh focus selection.
    pub focus_budget: u32,
    /// Maximum length of the ranked focus list.
    pub focus_rank_limit: usize,
    /// Seed the default blueprint when the survey store is empty.
    pub seed_default: bool,
}

impl Default for SurveyBehavior {
    fn default() -> Self {
        Self {
            focus_budget: DEFAULT_BUDGET,
            focus_rank_limit: DEFAULT_RANK_LIMIT,
            seed_default: true,
        }
    }
}

impl SurveyBehavior {
    // ==================== Builder Methods ====================

    pub fn with_focus_budget(mut self, budget: u32) -> Self {
        self.focus_budget = budget;
        self
    }

    pub fn with_focus_rank_limit(mut self, limit: usize) -> Self {
        self.focus_rank_limit = limit;
        self
    }

    pub fn without_seed(mut self) -> Self {
        self.seed_default = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_domain() {
        let behavior = SurveyBehavior::default();
        assert_eq!(behavior.focus_budget, 10);
        assert_eq!(behavior.focus_rank_limit, 3);
        assert!(behavior.seed_default);
    }

    #[test]
    fn test_builder() {
        let behavior = SurveyBehavior::default()
            .with_focus_budget(20)
            .with_focus_rank_limit(5)
            .without_seed();
        assert_eq!(behavior.focus_budget, 20);
        assert_eq!(behavior.focus_rank_limit, 5);
        assert!(!behavior.seed_default);
    }
}
