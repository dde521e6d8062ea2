//! Survey mirror port
//!
//! Publishes blueprints next to the mirrored runs so another device can
//! fetch them. Like the run mirror it is secondary: the local survey
//! repository stays authoritative.

use super::run_mirror::NoMirror;
use super::run_repository::RepositoryError;
use async_trait::async_trait;
use selfcheck_domain::SurveyBlueprint;

#[async_trait]
pub trait SurveyMirror: Send + Sync {
    /// Upsert the blueprint document.
    async fn push_survey(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError>;

    /// The mirrored blueprint, or `Ok(None)` if the mirror has none.
    async fn fetch_survey(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError>;
}

#[async_trait]
impl SurveyMirror for NoMirror {
    async fn push_survey(&self, _survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn fetch_survey(&self, _survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
        Ok(None)
    }
}
