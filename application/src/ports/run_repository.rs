//! Run repository port
//!
//! Storage contract for [`ResponseState`] records. The operations are split
//! into two groups:
//!
//! - [`RunRepository`]: required core operations (create/get/save/remove)
//! - [`RunQueries`]: listing operations; `list_runs_by_survey` and
//!   `latest_completed_run` are derived from `list_runs`
//!
//! Adapters that support both get [`RunStore`] for free.

use async_trait::async_trait;
use selfcheck_domain::{OwnerScope, ResponseState, Timestamp, new_run_id};
use thiserror::Error;

/// Errors raised by storage adapters.
///
/// Looking up an unknown id is not an error: it yields `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Core run storage operations.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Fetch a run by id.
    async fn get_run(&self, scope: &OwnerScope, run_id: &str)
    -> Result<Option<ResponseState>, RepositoryError>;

    /// Full-object upsert keyed by `run_id`.
    async fn save_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError>;

    /// Delete the whole record. Removing an unknown id is a no-op.
    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError>;

    /// Delete every run in this scope's bucket (other scopes untouched).
    async fn clear_all(&self, scope: &OwnerScope) -> Result<(), RepositoryError>;

    /// Create and persist a fresh run with a newly generated id.
    async fn create_run(
        &self,
        scope: &OwnerScope,
        survey_id: &str,
        now: Timestamp,
    ) -> Result<ResponseState, RepositoryError> {
        let run = ResponseState::start(new_run_id(now), survey_id, now);
        self.save_run(scope, &run).await?;
        Ok(run)
    }
}

/// Listing operations over runs.
#[async_trait]
pub trait RunQueries: Send + Sync {
    /// Every run in the scope, in no particular order.
    async fn list_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError>;

    /// Runs started against one blueprint, newest `startedAt` first.
    async fn list_runs_by_survey(
        &self,
        scope: &OwnerScope,
        survey_id: &str,
    ) -> Result<Vec<ResponseState>, RepositoryError> {
        let mut runs: Vec<_> = self
            .list_runs(scope)
            .await?
            .into_iter()
            .filter(|r| r.survey_id == survey_id)
            .collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.run_id.cmp(&a.run_id)));
        Ok(runs)
    }

    /// Among completed runs of a blueprint, the one with the greatest `completedAt`.
    async fn latest_completed_run(
        &self,
        scope: &OwnerScope,
        survey_id: &str,
    ) -> Result<Option<ResponseState>, RepositoryError> {
        Ok(self
            .list_runs_by_survey(scope, survey_id)
            .await?
            .into_iter()
            .filter(|r| r.completed_at.is_some())
            .max_by_key(|r| r.completed_at))
    }
}

/// Adapters offering both operation groups.
pub trait RunStore: RunRepository + RunQueries {}

impl<T: RunRepository + RunQueries + ?Sized> RunStore for T {}
