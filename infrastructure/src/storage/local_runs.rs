//! File-backed run repository.
//!
//! Runs are kept in one bucket file per owner scope,
//! `runs_v1__uid_<owner>.json`, shaped `{"byId": {runId: run}}`. The
//! anonymous scope uses the `anon` owner key. Clearing a scope deletes only
//! its own file. Saves and removals refuse to touch a bucket file that does
//! not parse, and keep entries they cannot decode.

use super::json_store::{JsonFileStore, file_safe};
use async_trait::async_trait;
use selfcheck_application::{RepositoryError, RunQueries, RunRepository};
use selfcheck_domain::{OwnerScope, ResponseState};
use tokio::sync::Mutex;
use tracing::debug;

/// Bucket file name of a scope.
pub fn runs_file_name(scope: &OwnerScope) -> String {
    format!("runs_v1__uid_{}.json", file_safe(scope.bucket_key()))
}

pub struct LocalRunRepository {
    store: JsonFileStore,
    // Serializes read-modify-write cycles on the bucket files.
    lock: Mutex<()>,
}

impl LocalRunRepository {
    pub fn new(store: JsonFileStore) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl RunRepository for LocalRunRepository {
    async fn get_run(
        &self,
        scope: &OwnerScope,
        run_id: &str,
    ) -> Result<Option<ResponseState>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let mut runs = self
            .store
            .read_bucket::<ResponseState>(&runs_file_name(scope))
            .await?;
        Ok(runs.remove(run_id))
    }

    async fn save_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let name = runs_file_name(scope);
        self.store.upsert_entry(&name, &run.run_id, run).await?;
        debug!("Saved run {} in {}", run.run_id, name);
        Ok(())
    }

    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        let name = runs_file_name(scope);
        if self.store.remove_entry(&name, run_id).await? {
            debug!("Removed run {} from {}", run_id, name);
        }
        Ok(())
    }

    async fn clear_all(&self, scope: &OwnerScope) -> Result<(), RepositoryError> {
        let _guard = self.lock.lock().await;
        self.store.remove(&runs_file_name(scope)).await
    }
}

#[async_trait]
impl RunQueries for LocalRunRepository {
    async fn list_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError> {
        let _guard = self.lock.lock().await;
        let runs = self
            .store
            .read_bucket::<ResponseState>(&runs_file_name(scope))
            .await?;
        Ok(runs.into_values().collect())
    }
}
