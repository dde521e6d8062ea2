//! Directory-backed document store used as the run and survey mirror.
//!
//! Layout under the mirror root:
//!
//! ```text
//! users/<owner>/runs/<runId>.json   RunDocV1
//! surveys/<surveyId>.json           SurveyDocV1
//! ```

use super::run_doc::{RunDocV1, from_run_doc, to_run_doc};
use super::survey_doc::{SurveyDocV1, doc_to_survey, survey_to_doc};
use crate::storage::{JsonFileStore, file_safe};
use async_trait::async_trait;
use selfcheck_application::{Clock, RepositoryError, RunMirror, SurveyMirror};
use selfcheck_domain::{OwnerScope, ResponseState, SurveyBlueprint};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DocumentStoreMirror {
    store: JsonFileStore,
    clock: Arc<dyn Clock>,
}

impl DocumentStoreMirror {
    pub fn new(store: JsonFileStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn runs_dir(scope: &OwnerScope) -> String {
        format!("users/{}/runs", file_safe(scope.bucket_key()))
    }

    fn run_doc_name(scope: &OwnerScope, run_id: &str) -> String {
        format!("{}/{}.json", Self::runs_dir(scope), file_safe(run_id))
    }

    fn survey_doc_name(survey_id: &str) -> String {
        format!("surveys/{}.json", file_safe(survey_id))
    }
}

#[async_trait]
impl RunMirror for DocumentStoreMirror {
    async fn push_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError> {
        let doc = to_run_doc(run, self.clock.now_millis());
        self.store
            .write(&Self::run_doc_name(scope, &run.run_id), &doc)
            .await?;
        debug!("Mirrored run {} for {}", run.run_id, scope);
        Ok(())
    }

    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError> {
        self.store.remove(&Self::run_doc_name(scope, run_id)).await
    }

    async fn pull_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError> {
        let dir = Self::runs_dir(scope);
        let mut runs = Vec::new();

        for name in self.store.list(&dir).await? {
            let path = format!("{}/{}", dir, name);
            let doc = match self.store.read_optional::<RunDocV1>(&path).await {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping unreadable run document {}: {}", path, e);
                    continue;
                }
            };
            match from_run_doc(doc) {
                Ok(run) => runs.push(run),
                Err(e) => warn!("Skipping run document {}: {}", path, e),
            }
        }

        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }
}

#[async_trait]
impl SurveyMirror for DocumentStoreMirror {
    async fn push_survey(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
        let doc = survey_to_doc(survey, self.clock.now_millis());
        self.store
            .write(&Self::survey_doc_name(&survey.survey_id), &doc)
            .await?;
        debug!("Mirrored blueprint {}", survey.survey_id);
        Ok(())
    }

    async fn fetch_survey(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
        let Some(doc) = self
            .store
            .read_optional::<SurveyDocV1>(&Self::survey_doc_name(survey_id))
            .await?
        else {
            return Ok(None);
        };
        doc_to_survey(doc)
            .map(Some)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfcheck_application::FixedClock;
    use selfcheck_domain::default_survey;

    fn mirror(dir: &tempfile::TempDir) -> DocumentStoreMirror {
        DocumentStoreMirror::new(
            JsonFileStore::new(dir.path()),
            Arc::new(FixedClock::new(7_000)),
        )
    }

    #[tokio::test]
    async fn test_push_writes_versioned_document() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror(&dir);
        let scope = OwnerScope::User("alice".into());

        mirror
            .push_run(&scope, &ResponseState::start("r_1", "s1", 5))
            .await
            .unwrap();

        let path = dir.path().join("users/alice/runs/r_1.json");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["updatedAt"], 7_000);
        assert_eq!(json["runId"], "r_1");
    }

    #[tokio::test]
    async fn test_pull_newest_first_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror(&dir);
        let scope = OwnerScope::User("alice".into());
        mirror.push_run(&scope, &ResponseState::start("r_a", "s1", 1)).await.unwrap();
        mirror.push_run(&scope, &ResponseState::start("r_b", "s1", 2)).await.unwrap();
        mirror
            .push_run(&OwnerScope::Anonymous, &ResponseState::start("r_c", "s1", 3))
            .await
            .unwrap();

        let ids: Vec<_> = mirror
            .pull_runs(&scope)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.run_id)
            .collect();
        assert_eq!(ids, vec!["r_b", "r_a"]);

        mirror.remove_run(&scope, "r_b").await.unwrap();
        assert_eq!(mirror.pull_runs(&scope).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pull_skips_foreign_schema_versions() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror(&dir);
        let scope = OwnerScope::Anonymous;
        mirror.push_run(&scope, &ResponseState::start("r_ok", "s1", 1)).await.unwrap();
        std::fs::write(
            dir.path().join("users/anon/runs/r_v2.json"),
            r#"{"schemaVersion":2,"runId":"r_v2","surveyId":"s1","startedAt":2,"updatedAt":2}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("users/anon/runs/junk.json"), "nope").unwrap();

        let runs = mirror.pull_runs(&scope).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].run_id, "r_ok");
    }

    #[tokio::test]
    async fn test_survey_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror(&dir);

        assert!(mirror.fetch_survey("s_default_v1").await.unwrap().is_none());
        mirror.push_survey(&default_survey()).await.unwrap();

        let fetched = mirror.fetch_survey("s_default_v1").await.unwrap().unwrap();
        assert_eq!(fetched, default_survey());
        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("surveys/s_default_v1.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(json["version"], serde_json::json!(1));
        assert_eq!(json["updatedAt"], 7_000);
    }

    #[tokio::test]
    async fn test_owner_keys_map_to_distinct_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror(&dir);
        let at = OwnerScope::User("alice@x.com".into());
        let underscore = OwnerScope::User("alice_x.com".into());
        mirror.push_run(&at, &ResponseState::start("r_1", "s1", 1)).await.unwrap();

        assert!(mirror.pull_runs(&underscore).await.unwrap().is_empty());
        assert_eq!(mirror.pull_runs(&at).await.unwrap().len(), 1);
        assert!(dir.path().join("users/alice%40x%2Ecom/runs/r_1.json").exists());
    }
}
