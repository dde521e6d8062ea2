//! Save survey use case
//!
//! Persists authored blueprints through the validating
//! [`SurveyRepository::save`], and seeds the default blueprint into an
//! empty store. Saved blueprints are published to the [`SurveyMirror`];
//! a publish failure is warned about and logged but never undoes the save.

use crate::ports::activity_log::{ActivityEvent, ActivityLogger, NoActivityLog};
use crate::ports::run_mirror::NoMirror;
use crate::ports::run_repository::RepositoryError;
use crate::ports::survey_mirror::SurveyMirror;
use crate::ports::survey_repository::{SaveOutcome, SurveyRepository};
use selfcheck_domain::{SurveyBlueprint, ValidationIssue, default_survey};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SaveSurveyError {
    /// The blueprint failed validation; nothing was written.
    #[error("Blueprint is invalid ({} issue(s))", .0.len())]
    Invalid(Vec<ValidationIssue>),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SaveSurveyError {
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            SaveSurveyError::Invalid(issues) => issues,
            SaveSurveyError::Repository(_) => &[],
        }
    }
}

pub struct SaveSurveyUseCase {
    surveys: Arc<dyn SurveyRepository>,
    mirror: Arc<dyn SurveyMirror>,
    activity: Arc<dyn ActivityLogger>,
}

impl SaveSurveyUseCase {
    pub fn new(surveys: Arc<dyn SurveyRepository>) -> Self {
        Self {
            surveys,
            mirror: Arc::new(NoMirror),
            activity: Arc::new(NoActivityLog),
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn SurveyMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_activity_logger(mut self, activity: Arc<dyn ActivityLogger>) -> Self {
        self.activity = activity;
        self
    }

    /// Validate and upsert a blueprint, then publish it.
    pub async fn save(&self, survey: &SurveyBlueprint) -> Result<(), SaveSurveyError> {
        self.store(survey).await?;
        self.publish(survey).await;
        Ok(())
    }

    /// Copy a blueprint from the mirror into local storage.
    ///
    /// `Ok(None)` when the mirror has no such blueprint. The mirrored copy
    /// goes through the same validation as any other save.
    pub async fn pull(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, SaveSurveyError> {
        let Some(survey) = self.mirror.fetch_survey(survey_id).await? else {
            return Ok(None);
        };
        self.store(&survey).await?;
        info!("Pulled blueprint {} from the mirror", survey_id);
        Ok(Some(survey))
    }

    /// Write the blueprint document to the mirror. Failures are only
    /// warned about and logged.
    pub async fn publish(&self, survey: &SurveyBlueprint) {
        match self.mirror.push_survey(survey).await {
            Ok(()) => debug!("Published blueprint {}", survey.survey_id),
            Err(e) => {
                warn!("Could not publish blueprint {}: {}", survey.survey_id, e);
                self.activity.log(ActivityEvent::new(
                    "mirror_failed",
                    serde_json::json!({
                        "surveyId": survey.survey_id,
                        "error": e.to_string(),
                    }),
                ));
            }
        }
    }

    async fn store(&self, survey: &SurveyBlueprint) -> Result<(), SaveSurveyError> {
        match self.surveys.save(survey).await? {
            SaveOutcome::Saved => {
                info!(
                    "Saved blueprint {} (version {}, {} prompts)",
                    survey.survey_id,
                    survey.version,
                    survey.prompt_count()
                );
                self.activity.log(ActivityEvent::new(
                    "survey_saved",
                    serde_json::json!({
                        "surveyId": survey.survey_id,
                        "version": survey.version,
                    }),
                ));
                Ok(())
            }
            SaveOutcome::Rejected(issues) => {
                warn!(
                    "Rejected blueprint {:?}: {} validation issue(s)",
                    survey.survey_id,
                    issues.len()
                );
                Err(SaveSurveyError::Invalid(issues))
            }
        }
    }

    /// Write the default blueprint if the store holds no blueprint at all.
    ///
    /// Returns whether the seed was written.
    pub async fn seed_if_empty(&self) -> Result<bool, SaveSurveyError> {
        if !self.surveys.list().await?.is_empty() {
            return Ok(false);
        }
        self.save(&default_survey()).await?;
        self.activity.log(ActivityEvent::new(
            "survey_seeded",
            serde_json::json!({ "surveyId": selfcheck_domain::DEFAULT_SURVEY_ID }),
        ));
        Ok(true)
    }
}
