//! Survey editor
//!
//! A draft-based editing session over one blueprint. The draft is a clone of
//! the stored blueprint; every edit produces a new draft and re-runs the
//! validator so [`SurveyEditor::issues`] always reflects the current draft.
//! Saving goes through the validating save and is refused while issues
//! remain.

use super::save_survey::SaveSurveyError;
use crate::ports::clock::Clock;
use crate::ports::run_repository::RepositoryError;
use crate::ports::survey_repository::{SaveOutcome, SurveyRepository};
use selfcheck_domain::{
    Category, Prompt, Scale, SurveyBlueprint, Timestamp, ValidationIssue, ValidationResult,
    validate_survey,
};
use std::sync::Arc;
use tracing::debug;

pub struct SurveyEditor {
    surveys: Arc<dyn SurveyRepository>,
    clock: Arc<dyn Clock>,
    draft: SurveyBlueprint,
    validation: ValidationResult,
    saved_at: Option<Timestamp>,
}

impl SurveyEditor {
    /// Start editing a new, unsaved blueprint.
    pub fn new(
        surveys: Arc<dyn SurveyRepository>,
        clock: Arc<dyn Clock>,
        draft: SurveyBlueprint,
    ) -> Self {
        let validation = validate_survey(&draft);
        Self {
            surveys,
            clock,
            draft,
            validation,
            saved_at: None,
        }
    }

    /// Load a stored blueprint into a draft. `Ok(None)` if the id is unknown.
    pub async fn load(
        surveys: Arc<dyn SurveyRepository>,
        clock: Arc<dyn Clock>,
        survey_id: &str,
    ) -> Result<Option<Self>, RepositoryError> {
        let Some(stored) = surveys.get(survey_id).await? else {
            return Ok(None);
        };
        debug!("Editing blueprint {}", survey_id);
        Ok(Some(Self::new(surveys, clock, stored)))
    }

    pub fn draft(&self) -> &SurveyBlueprint {
        &self.draft
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        self.validation.issues()
    }

    pub fn can_save(&self) -> bool {
        self.validation.is_ok()
    }

    /// When the draft was last persisted in this session.
    pub fn saved_at(&self) -> Option<Timestamp> {
        self.saved_at
    }

    /// Replace the draft with `edit(draft)` and re-validate.
    pub fn update(&mut self, edit: impl FnOnce(&SurveyBlueprint) -> SurveyBlueprint) {
        self.draft = edit(&self.draft);
        self.validation = validate_survey(&self.draft);
    }

    // ==================== Convenience Edits ====================

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.update(|d| SurveyBlueprint {
            title,
            ..d.clone()
        });
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.update(|d| SurveyBlueprint {
            description,
            ..d.clone()
        });
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.update(|d| SurveyBlueprint { scale, ..d.clone() });
    }

    pub fn add_category(&mut self, category: Category) {
        self.update(|d| d.clone().with_category(category));
    }

    pub fn add_prompt(&mut self, prompt: Prompt) {
        self.update(|d| d.clone().with_prompt(prompt));
    }

    /// Remove a prompt by id. Returns whether it existed.
    pub fn remove_prompt(&mut self, prompt_id: &str) -> bool {
        if self.draft.prompt(prompt_id).is_none() {
            return false;
        }
        self.update(|d| {
            let mut next = d.clone();
            next.prompts.retain(|p| p.prompt_id != prompt_id);
            next
        });
        true
    }

    /// Move a prompt to `to` (clamped to the last position). Returns whether
    /// the prompt exists.
    pub fn move_prompt(&mut self, prompt_id: &str, to: usize) -> bool {
        let Some(from) = self.draft.prompt_index(prompt_id) else {
            return false;
        };
        self.update(|d| {
            let mut next = d.clone();
            let prompt = next.prompts.remove(from);
            let to = to.min(next.prompts.len());
            next.prompts.insert(to, prompt);
            next
        });
        true
    }

    /// Persist the draft. Refused with the current issues while invalid.
    pub async fn save(&mut self) -> Result<Timestamp, SaveSurveyError> {
        match self.surveys.save(&self.draft).await? {
            SaveOutcome::Saved => {
                let now = self.clock.now_millis();
                self.saved_at = Some(now);
                debug!("Saved draft of {} at {}", self.draft.survey_id, now);
                Ok(now)
            }
            SaveOutcome::Rejected(issues) => Err(SaveSurveyError::Invalid(issues)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::clock::FixedClock;
    use crate::use_cases::testing::MemSurveys;
    use selfcheck_domain::{IssueCode, default_survey};

    async fn editor(surveys: Arc<MemSurveys>) -> SurveyEditor {
        SurveyEditor::load(surveys, Arc::new(FixedClock::new(5_000)), "s_default_v1")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_unknown_is_none() {
        let surveys = Arc::new(MemSurveys::default());
        let editor = SurveyEditor::load(surveys, Arc::new(FixedClock::new(0)), "nope")
            .await
            .unwrap();
        assert!(editor.is_none());
    }

    #[tokio::test]
    async fn test_edits_revalidate() {
        let surveys = Arc::new(MemSurveys::with([default_survey()]));
        let mut editor = editor(surveys).await;
        assert!(editor.can_save());

        editor.set_title("   ");
        assert!(!editor.can_save());
        assert_eq!(editor.issues()[0].path, "title");

        editor.set_title("Evening check-in");
        assert!(editor.can_save());
        assert!(editor.issues().is_empty());
    }

    #[tokio::test]
    async fn test_draft_does_not_touch_store_until_saved() {
        let surveys = Arc::new(MemSurveys::with([default_survey()]));
        let mut editor = editor(surveys.clone()).await;

        editor.set_title("Changed");

        let stored = surveys.get("s_default_v1").await.unwrap().unwrap();
        assert_eq!(stored.title, default_survey().title);
        assert_eq!(editor.saved_at(), None);

        assert_eq!(editor.save().await.unwrap(), 5_000);
        assert_eq!(editor.saved_at(), Some(5_000));
        let stored = surveys.get("s_default_v1").await.unwrap().unwrap();
        assert_eq!(stored.title, "Changed");
    }

    #[tokio::test]
    async fn test_save_refused_while_invalid() {
        let surveys = Arc::new(MemSurveys::with([default_survey()]));
        let mut editor = editor(surveys.clone()).await;

        editor.add_prompt(Prompt::new("p_sleep", "c_sleep", "How did you sleep?"));
        let err = editor.save().await.unwrap_err();

        assert_eq!(err.issues()[0].code, IssueCode::MissingRef);
        assert_eq!(err.issues()[0].path, "prompts[3].categoryId");
        let stored = surveys.get("s_default_v1").await.unwrap().unwrap();
        assert_eq!(stored.prompt_count(), 3);

        editor.add_category(Category::new("c_sleep", "Sleep"));
        assert!(editor.can_save());
        editor.save().await.unwrap();
        let stored = surveys.get("s_default_v1").await.unwrap().unwrap();
        assert_eq!(stored.prompt_count(), 4);
    }

    #[tokio::test]
    async fn test_move_and_remove_prompt() {
        let surveys = Arc::new(MemSurveys::with([default_survey()]));
        let mut editor = editor(surveys).await;

        assert!(editor.move_prompt("p_mood", 0));
        let order: Vec<_> = editor.draft().prompt_ids().collect();
        assert_eq!(order, vec!["p_mood", "p_energy", "p_focus"]);

        assert!(editor.move_prompt("p_mood", 99));
        let order: Vec<_> = editor.draft().prompt_ids().collect();
        assert_eq!(order, vec!["p_energy", "p_focus", "p_mood"]);

        assert!(editor.remove_prompt("p_focus"));
        assert!(!editor.remove_prompt("p_focus"));
        assert!(!editor.move_prompt("p_focus", 0));
        assert_eq!(editor.draft().prompt_count(), 2);
    }

    #[tokio::test]
    async fn test_removing_every_prompt_blocks_save() {
        let surveys = Arc::new(MemSurveys::with([default_survey()]));
        let mut editor = editor(surveys).await;

        for id in ["p_energy", "p_focus", "p_mood"] {
            editor.remove_prompt(id);
        }

        assert!(!editor.can_save());
        assert_eq!(editor.issues()[0].path, "prompts");
    }

    #[tokio::test]
    async fn test_set_scale() {
        let surveys = Arc::new(MemSurveys::with([default_survey()]));
        let mut editor = editor(surveys).await;

        editor.set_scale(Scale::new(1.0, 1.0, 1.0));
        assert_eq!(editor.issues()[0].code, IssueCode::InvalidScale);

        editor.set_scale(Scale::new(0.0, 4.0, 1.0));
        assert!(editor.can_save());
    }
}
