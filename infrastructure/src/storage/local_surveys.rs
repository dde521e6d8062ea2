//! File-backed survey repository.
//!
//! All blueprints live in `surveys_v1.json`, shaped
//! `{"byId": {surveyId: blueprint}}`. Blueprints are shared across owners.
//! Like the run buckets, an unparsable file is never overwritten.

use super::json_store::JsonFileStore;
use async_trait::async_trait;
use selfcheck_application::{RepositoryError, SurveyRepository};
use selfcheck_domain::SurveyBlueprint;
use tokio::sync::Mutex;
use tracing::debug;

pub const SURVEYS_FILE_NAME: &str = "surveys_v1.json";

pub struct LocalSurveyRepository {
    store: JsonFileStore,
    lock: Mutex<()>,
}

impl LocalSurveyRepository {
    pub fn new(store: JsonFileStore) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl SurveyRepository for LocalSurveyRepository {
    async fn get(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut surveys = self
            .store
            .read_bucket::<SurveyBlueprint>(SURVEYS_FILE_NAME)
            .await?;
        Ok(surveys.remove(survey_id))
    }

    async fn list(&self) -> Result<Vec<SurveyBlueprint>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let surveys = self
            .store
            .read_bucket::<SurveyBlueprint>(SURVEYS_FILE_NAME)
            .await?;
        Ok(surveys.into_values().collect())
    }

    async fn save_unchecked(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        self.store
            .upsert_entry(SURVEYS_FILE_NAME, &survey.survey_id, survey)
            .await?;
        debug!("Stored blueprint {}", survey.survey_id);
        Ok(())
    }

    async fn remove(&self, survey_id: &str) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        if self.store.remove_entry(SURVEYS_FILE_NAME, survey_id).await? {
            debug!("Removed blueprint {}", survey_id);
        }
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        self.store.remove(SURVEYS_FILE_NAME).await
    }
}
