//! In-memory repositories for ephemeral sessions (nothing touches disk).

use async_trait::async_trait;
use selfcheck_application::{RepositoryError, RunQueries, RunRepository, SurveyRepository};
use selfcheck_domain::{Id, OwnerScope, ResponseState, SurveyBlueprint};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryRunRepository {
    buckets: Mutex<HashMap<String, BTreeMap<Id, ResponseState>>>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn get_run(
        &self,
        scope: &OwnerScope,
        run_id: &str,
    ) -> Result<Option<ResponseState>, RepositoryError> {
        Ok(self
            .buckets
            .lock()
            .await
            .get(scope.bucket_key())
            .and_then(|bucket| bucket.get(run_id).cloned()))
    }

    async fn save_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError> {
        self.buckets
            .lock()
            .await
            .entry(scope.bucket_key().to_string())
            .or_default()
            .insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError> {
        if let Some(bucket) = self.buckets.lock().await.get_mut(scope.bucket_key()) {
            bucket.remove(run_id);
        }
        Ok(())
    }

    async fn clear_all(&self, scope: &OwnerScope) -> Result<(), RepositoryError> {
        self.buckets.lock().await.remove(scope.bucket_key());
        Ok(())
    }
}

#[async_trait]
impl RunQueries for InMemoryRunRepository {
    async fn list_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError> {
        Ok(self
            .buckets
            .lock()
            .await
            .get(scope.bucket_key())
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemorySurveyRepository {
    surveys: Mutex<BTreeMap<Id, SurveyBlueprint>>,
}

impl InMemorySurveyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SurveyRepository for InMemorySurveyRepository {
    async fn get(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
        Ok(self.surveys.lock().await.get(survey_id).cloned())
    }

    async fn list(&self) -> Result<Vec<SurveyBlueprint>, RepositoryError> {
        Ok(self.surveys.lock().await.values().cloned().collect())
    }

    async fn save_unchecked(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
        self.surveys
            .lock()
            .await
            .insert(survey.survey_id.clone(), survey.clone());
        Ok(())
    }

    async fn remove(&self, survey_id: &str) -> Result<(), RepositoryError> {
        self.surveys.lock().await.remove(survey_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        self.surveys.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfcheck_domain::default_survey;

    #[tokio::test]
    async fn test_runs_are_scoped() {
        let repo = InMemoryRunRepository::new();
        let alice = OwnerScope::User("alice".into());

        let run = repo.create_run(&alice, "s1", 42).await.unwrap();

        assert!(repo.get_run(&alice, &run.run_id).await.unwrap().is_some());
        assert!(repo.get_run(&OwnerScope::Anonymous, &run.run_id).await.unwrap().is_none());

        repo.clear_all(&alice).await.unwrap();
        assert!(repo.list_runs(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_surveys_validate_on_save() {
        let repo = InMemorySurveyRepository::new();
        let mut bad = default_survey();
        bad.title.clear();

        assert!(!repo.save(&bad).await.unwrap().is_saved());
        assert!(repo.save(&default_survey()).await.unwrap().is_saved());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
