//! Post-completion focus selection.
//!
//! After seeing their results a user may pick the categories they want to
//! work on, either as an ordered top-N ("rank") or by spreading a point
//! budget ("points"). This is annotation only and never affects scoring.
//!
//! Every operation returns a new [`FocusState`]; switching modes keeps the
//! data of the other mode.

use crate::core::error::DomainError;
use crate::core::ids::Id;
use crate::survey::entities::SurveyBlueprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default point budget.
pub const DEFAULT_BUDGET: u32 = 10;

/// Default length of the ranked list.
pub const DEFAULT_RANK_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    #[default]
    Rank,
    Points,
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusMode::Rank => write!(f, "rank"),
            FocusMode::Points => write!(f, "points"),
        }
    }
}

impl std::str::FromStr for FocusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rank" | "top" => Ok(FocusMode::Rank),
            "points" | "budget" => Ok(FocusMode::Points),
            _ => Err(format!("Invalid FocusMode: {}", s)),
        }
    }
}

/// Focus annotation stored on a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub mode: FocusMode,
    /// Categories the user wants to focus on (order irrelevant).
    #[serde(default)]
    pub selected_category_ids: Vec<Id>,
    /// Rank mode: category ids in priority order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranks: Option<Vec<Id>>,
    /// Points mode: allocated points per category id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<BTreeMap<Id, u32>>,
    /// Points mode budget; [`DEFAULT_BUDGET`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u32>,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            mode: FocusMode::Rank,
            selected_category_ids: Vec::new(),
            ranks: Some(Vec::new()),
            points: Some(BTreeMap::new()),
            budget: Some(DEFAULT_BUDGET),
        }
    }
}

impl FocusState {
    pub fn with_budget(mut self, budget: u32) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn budget(&self) -> u32 {
        self.budget.unwrap_or(DEFAULT_BUDGET)
    }

    pub fn ranks(&self) -> &[Id] {
        self.ranks.as_deref().unwrap_or_default()
    }

    pub fn points_for(&self, category_id: &str) -> u32 {
        self.points
            .as_ref()
            .and_then(|p| p.get(category_id).copied())
            .unwrap_or(0)
    }

    pub fn is_selected(&self, category_id: &str) -> bool {
        self.selected_category_ids.iter().any(|c| c == category_id)
    }

    /// 1-based rank of a category, if ranked.
    pub fn rank_of(&self, category_id: &str) -> Option<usize> {
        self.ranks().iter().position(|c| c == category_id).map(|i| i + 1)
    }

    pub fn total_allocated(&self) -> u32 {
        self.points
            .as_ref()
            .map(|p| p.values().sum())
            .unwrap_or(0)
    }

    /// Unallocated points, never negative.
    pub fn remaining(&self) -> u32 {
        self.budget().saturating_sub(self.total_allocated())
    }

    /// Switch mode, keeping the data of both modes.
    pub fn with_mode(&self, mode: FocusMode) -> Self {
        let mut next = self.clone();
        next.mode = mode;
        next.ranks.get_or_insert_with(Vec::new);
        next.points.get_or_insert_with(BTreeMap::new);
        next.budget.get_or_insert(DEFAULT_BUDGET);
        next
    }

    /// Select or deselect a category. Deselecting also drops it from the
    /// ranked list and the point allocation.
    pub fn toggle_selected(&self, category_id: &str) -> Self {
        let mut next = self.clone();
        if next.is_selected(category_id) {
            next.selected_category_ids.retain(|c| c != category_id);
            let ranks = next.ranks.get_or_insert_with(Vec::new);
            ranks.retain(|c| c != category_id);
            next.points
                .get_or_insert_with(BTreeMap::new)
                .remove(category_id);
        } else {
            next.selected_category_ids.push(category_id.to_string());
        }
        next
    }

    /// Add a category to the end of the ranked list, or remove it if
    /// already ranked. Ranking auto-selects. A full list is left as is.
    pub fn rank_click(&self, category_id: &str, limit: usize) -> Self {
        let mut next = self.clone();
        let ranks = next.ranks.get_or_insert_with(Vec::new);

        if let Some(pos) = ranks.iter().position(|c| c == category_id) {
            ranks.remove(pos);
        } else {
            if ranks.len() >= limit {
                return self.clone();
            }
            ranks.push(category_id.to_string());
        }

        next.select(category_id);
        next.mode = FocusMode::Rank;
        next
    }

    /// Allocate points to a category. The value is floored and clamped to
    /// `[0, budget]`; allocating auto-selects.
    pub fn set_points(&self, category_id: &str, value: f64) -> Self {
        let budget = self.budget();
        let safe = if value.is_finite() {
            value.floor().clamp(0.0, budget as f64) as u32
        } else {
            0
        };

        let mut next = self.clone();
        next.points
            .get_or_insert_with(BTreeMap::new)
            .insert(category_id.to_string(), safe);
        next.select(category_id);
        next.mode = FocusMode::Points;
        next.budget = Some(budget);
        next
    }

    fn select(&mut self, category_id: &str) {
        if !self.is_selected(category_id) {
            self.selected_category_ids.push(category_id.to_string());
        }
    }

    /// The point allocation must fit the budget.
    pub fn check_budget(&self) -> Result<(), DomainError> {
        let allocated = self.total_allocated();
        let budget = self.budget();
        if allocated > budget {
            return Err(DomainError::OverBudget { allocated, budget });
        }
        Ok(())
    }

    /// Every referenced category must exist in the blueprint.
    pub fn check_categories(&self, survey: &SurveyBlueprint) -> Result<(), DomainError> {
        let referenced = self
            .selected_category_ids
            .iter()
            .chain(self.ranks())
            .chain(self.points.iter().flat_map(|p| p.keys()));
        for category_id in referenced {
            if survey.category(category_id).is_none() {
                return Err(DomainError::UnknownCategory(category_id.clone()));
            }
        }
        Ok(())
    }
}
