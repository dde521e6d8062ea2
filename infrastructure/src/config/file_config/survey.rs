//! Survey behaviour configuration from TOML (`[survey]` section)

use selfcheck_application::SurveyBehavior;
use serde::{Deserialize, Serialize};

/// Raw survey configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSurveyConfig {
    /// Point budget of a new focus selection
    pub focus_budget: u32,
    /// Maximum number of ranked focus categories
    pub focus_rank_limit: usize,
    /// Seed the default blueprint into an empty store
    pub seed_default: bool,
}

impl Default for FileSurveyConfig {
    fn default() -> Self {
        let behavior = SurveyBehavior::default();
        Self {
            focus_budget: behavior.focus_budget,
            focus_rank_limit: behavior.focus_rank_limit,
            seed_default: behavior.seed_default,
        }
    }
}

impl FileSurveyConfig {
    pub fn to_behavior(&self) -> SurveyBehavior {
        SurveyBehavior {
            focus_budget: self.focus_budget,
            focus_rank_limit: self.focus_rank_limit,
            seed_default: self.seed_default,
        }
    }
}
