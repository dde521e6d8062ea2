//! Run mirror port
//!
//! A secondary, remote-style sink for runs. The local run repository is the
//! primary store: a run is durable once the local save succeeds, and a
//! mirror failure must never revert or block local progress.

use super::run_repository::RepositoryError;
use async_trait::async_trait;
use selfcheck_domain::{OwnerScope, ResponseState};

#[async_trait]
pub trait RunMirror: Send + Sync {
    /// Upsert the full run in the mirror.
    async fn push_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError>;

    /// Delete the run from the mirror.
    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError>;

    /// Every run the mirror holds for the scope, newest `startedAt` first.
    async fn pull_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError>;
}

/// Mirror that accepts everything and holds nothing (mirroring disabled).
pub struct NoMirror;

#[async_trait]
impl RunMirror for NoMirror {
    async fn push_run(&self, _scope: &OwnerScope, _run: &ResponseState) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn remove_run(&self, _scope: &OwnerScope, _run_id: &str) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn pull_runs(&self, _scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError> {
        Ok(Vec::new())
    }
}
