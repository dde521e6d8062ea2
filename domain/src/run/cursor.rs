//! Index-based navigation through a run's prompts.
//!
//! The cursor is view state: it is rebuilt on every (re)load and never
//! persisted with the run.

use super::entities::ResponseState;
use super::lifecycle::first_unanswered;
use crate::survey::entities::{Prompt, SurveyBlueprint};

/// What the forward action does at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardAction {
    /// Move to the next prompt.
    Next,
    /// Last prompt: finish the run and leave the run screen.
    Finish,
}

/// Position within a blueprint's prompt list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCursor {
    index: usize,
}

impl RunCursor {
    /// Cursor at an explicit index.
    pub fn at(index: usize) -> Self {
        Self { index }
    }

    /// Resume position: the first unanswered prompt, or 0 when the run is
    /// fresh or already complete.
    pub fn resume(run: &ResponseState, survey: &SurveyBlueprint) -> Self {
        Self {
            index: first_unanswered(run, survey).unwrap_or(0),
        }
    }

    /// 0-based index, clamped to the prompt range.
    pub fn index(&self, survey: &SurveyBlueprint) -> usize {
        self.index.min(survey.prompts.len().saturating_sub(1))
    }

    /// 1-based position for display (0 when the blueprint has no prompts).
    pub fn position(&self, survey: &SurveyBlueprint) -> usize {
        if survey.prompts.is_empty() {
            0
        } else {
            self.index(survey) + 1
        }
    }

    pub fn current_prompt<'a>(&self, survey: &'a SurveyBlueprint) -> Option<&'a Prompt> {
        survey.prompts.get(self.index(survey))
    }

    /// Current prompt's recorded answer, if any.
    pub fn current_value(&self, run: &ResponseState, survey: &SurveyBlueprint) -> Option<f64> {
        self.current_prompt(survey)
            .and_then(|p| run.answer(&p.prompt_id))
    }

    pub fn is_last(&self, survey: &SurveyBlueprint) -> bool {
        !survey.prompts.is_empty() && self.index(survey) + 1 >= survey.prompts.len()
    }

    pub fn forward_action(&self, survey: &SurveyBlueprint) -> ForwardAction {
        if self.is_last(survey) {
            ForwardAction::Finish
        } else {
            ForwardAction::Next
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    /// Advancing requires an answer on the current prompt and a prompt after it.
    pub fn can_go_next(&self, run: &ResponseState, survey: &SurveyBlueprint) -> bool {
        !self.is_last(survey) && self.current_value(run, survey).is_some()
    }

    /// Step back one prompt. Returns whether the cursor moved.
    pub fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one prompt. Returns whether the cursor moved.
    pub fn go_next(&mut self, run: &ResponseState, survey: &SurveyBlueprint) -> bool {
        if !self.can_go_next(run, survey) {
            return false;
        }
        self.index = self.index(survey) + 1;
        true
    }
}
