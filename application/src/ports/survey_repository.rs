//! Survey repository port
//!
//! Storage contract for [`SurveyBlueprint`]s, keyed by `surveyId` with
//! upsert semantics. [`SurveyRepository::save`] runs the validator first;
//! an invalid blueprint is never written, not even partially.

use super::run_repository::RepositoryError;
use async_trait::async_trait;
use selfcheck_domain::{SurveyBlueprint, ValidationIssue, ValidationResult, validate_survey};

/// Result of a validating save.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing was written; these are the validator's issues.
    Rejected(Vec<ValidationIssue>),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

#[async_trait]
pub trait SurveyRepository: Send + Sync {
    async fn get(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError>;

    async fn list(&self) -> Result<Vec<SurveyBlueprint>, RepositoryError>;

    /// Raw write with no validation. Callers go through [`SurveyRepository::save`].
    async fn save_unchecked(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError>;

    async fn remove(&self, survey_id: &str) -> Result<(), RepositoryError>;

    async fn clear_all(&self) -> Result<(), RepositoryError>;

    /// Validate, then upsert by `surveyId`.
    async fn save(&self, survey: &SurveyBlueprint) -> Result<SaveOutcome, RepositoryError> {
        match validate_survey(survey) {
            ValidationResult::Ok => {
                self.save_unchecked(survey).await?;
                Ok(SaveOutcome::Saved)
            }
            ValidationResult::Invalid { issues } => Ok(SaveOutcome::Rejected(issues)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfcheck_domain::{IssueCode, default_survey};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        writes: Mutex<Vec<SurveyBlueprint>>,
    }

    #[async_trait]
    impl SurveyRepository for Recording {
        async fn get(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
            Ok(self
                .writes
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|s| s.survey_id == survey_id)
                .cloned())
        }

        async fn list(&self) -> Result<Vec<SurveyBlueprint>, RepositoryError> {
            Ok(self.writes.lock().unwrap().clone())
        }

        async fn save_unchecked(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
            self.writes.lock().unwrap().push(survey.clone());
            Ok(())
        }

        async fn remove(&self, _survey_id: &str) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn clear_all(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_valid_survey_is_written() {
        let repo = Recording::default();
        let outcome = repo.save(&default_survey()).await.unwrap();
        assert!(outcome.is_saved());
        assert_eq!(repo.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_survey_is_rejected_without_write() {
        let repo = Recording::default();
        let mut survey = default_survey();
        survey.title = " ".to_string();
        survey.prompts[0].category_id = "c_unknown".to_string();

        let outcome = repo.save(&survey).await.unwrap();
        let SaveOutcome::Rejected(issues) = outcome else {
            panic!("expected rejection");
        };
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![IssueCode::Empty, IssueCode::MissingRef]);
        assert!(repo.writes.lock().unwrap().is_empty());
    }
}
