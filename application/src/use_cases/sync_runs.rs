//! Mirror synchronisation
//!
//! The local run store is authoritative. This module pushes local runs to
//! the [`RunMirror`], replays mirror writes that failed earlier
//! ([`SyncQueue`]), and hydrates the local store from the mirror when a
//! device has no completed run for a blueprint yet.

use crate::ports::activity_log::{ActivityEvent, ActivityLogger, NoActivityLog};
use crate::ports::run_mirror::RunMirror;
use crate::ports::run_repository::{RepositoryError, RunStore};
use selfcheck_domain::{Id, OwnerScope, ResponseState};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Local store error: {0}")]
    Local(RepositoryError),

    #[error("Mirror error: {0}")]
    Mirror(RepositoryError),
}

/// A mirror write waiting to be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSync {
    Push { scope: OwnerScope, run_id: Id },
    Remove { scope: OwnerScope, run_id: Id },
}

impl PendingSync {
    pub fn run_id(&self) -> &str {
        match self {
            PendingSync::Push { run_id, .. } | PendingSync::Remove { run_id, .. } => run_id,
        }
    }

    fn scope(&self) -> &OwnerScope {
        match self {
            PendingSync::Push { scope, .. } | PendingSync::Remove { scope, .. } => scope,
        }
    }
}

/// Failed mirror writes, oldest first.
///
/// Only the latest operation per run is kept: a queued push is replaced by
/// a later remove of the same run and vice versa.
#[derive(Default)]
pub struct SyncQueue {
    pending: Mutex<Vec<PendingSync>>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn enqueue(&self, item: PendingSync) {
        let mut pending = self.pending.lock().await;
        pending.retain(|p| !(p.scope() == item.scope() && p.run_id() == item.run_id()));
        pending.push(item);
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    async fn drain(&self) -> Vec<PendingSync> {
        std::mem::take(&mut *self.pending.lock().await)
    }
}

/// Outcome counts of a sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub pushed: usize,
    pub removed: usize,
    pub failed: usize,
    /// Queued pushes whose run no longer exists locally.
    pub dropped: usize,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

pub struct SyncRunsUseCase {
    runs: Arc<dyn RunStore>,
    mirror: Arc<dyn RunMirror>,
    queue: Arc<SyncQueue>,
    activity: Arc<dyn ActivityLogger>,
}

impl SyncRunsUseCase {
    pub fn new(runs: Arc<dyn RunStore>, mirror: Arc<dyn RunMirror>, queue: Arc<SyncQueue>) -> Self {
        Self {
            runs,
            mirror,
            queue,
            activity: Arc::new(NoActivityLog),
        }
    }

    pub fn with_activity_logger(mut self, activity: Arc<dyn ActivityLogger>) -> Self {
        self.activity = activity;
        self
    }

    /// Push every local run of the scope. Failures are queued, not returned.
    pub async fn sync_all(&self, scope: &OwnerScope) -> Result<SyncReport, SyncError> {
        let runs = self.runs.list_runs(scope).await.map_err(SyncError::Local)?;
        let mut report = SyncReport::default();

        for run in &runs {
            if self.push_or_queue(scope, run).await {
                report.pushed += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "Synced {} of {} run(s) for {}",
            report.pushed,
            runs.len(),
            scope
        );
        self.activity.log(ActivityEvent::new(
            "sync_completed",
            serde_json::json!({
                "owner": scope.bucket_key(),
                "pushed": report.pushed,
                "failed": report.failed,
            }),
        ));
        Ok(report)
    }

    /// Push the most recently started run of a blueprint.
    ///
    /// Returns the pushed run id, or `None` when the scope has no run for it.
    pub async fn sync_latest(
        &self,
        scope: &OwnerScope,
        survey_id: &str,
    ) -> Result<Option<Id>, SyncError> {
        let runs = self
            .runs
            .list_runs_by_survey(scope, survey_id)
            .await
            .map_err(SyncError::Local)?;
        let Some(latest) = runs.into_iter().next() else {
            return Ok(None);
        };

        if let Err(e) = self.mirror.push_run(scope, &latest).await {
            let item = PendingSync::Push {
                scope: scope.clone(),
                run_id: latest.run_id.clone(),
            };
            self.record_failure(scope, item, &e).await;
            return Err(SyncError::Mirror(e));
        }
        debug!("Mirrored latest run {} of {}", latest.run_id, survey_id);
        Ok(Some(latest.run_id))
    }

    /// Replay every queued mirror write. Writes that fail again are re-queued.
    pub async fn retry_pending(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for item in self.queue.drain().await {
            let result = match &item {
                PendingSync::Push { scope, run_id } => match self.runs.get_run(scope, run_id).await {
                    Ok(Some(run)) => self.mirror.push_run(scope, &run).await.map(|_| true),
                    Ok(None) => {
                        report.dropped += 1;
                        continue;
                    }
                    Err(e) => Err(e),
                },
                PendingSync::Remove { scope, run_id } => {
                    self.mirror.remove_run(scope, run_id).await.map(|_| false)
                }
            };

            match result {
                Ok(true) => report.pushed += 1,
                Ok(false) => report.removed += 1,
                Err(e) => {
                    warn!("Retry of {} still failing: {}", item.run_id(), e);
                    report.failed += 1;
                    self.queue.enqueue(item).await;
                }
            }
        }

        if report.pushed + report.removed + report.failed > 0 {
            info!(
                "Retried mirror writes: {} pushed, {} removed, {} failed",
                report.pushed, report.removed, report.failed
            );
        }
        report
    }

    /// For each blueprint without a completed local run, copy the latest
    /// completed run from the mirror into the local store.
    ///
    /// Returns the hydrated runs.
    pub async fn hydrate_latest_completed(
        &self,
        scope: &OwnerScope,
        survey_ids: &[Id],
    ) -> Result<Vec<ResponseState>, SyncError> {
        let mut missing = Vec::new();
        for survey_id in survey_ids {
            let local = self
                .runs
                .latest_completed_run(scope, survey_id)
                .await
                .map_err(SyncError::Local)?;
            if local.is_none() {
                missing.push(survey_id);
            }
        }
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let remote = self.mirror.pull_runs(scope).await.map_err(SyncError::Mirror)?;
        let mut hydrated = Vec::new();
        for survey_id in missing {
            let latest = remote
                .iter()
                .filter(|r| &r.survey_id == survey_id && r.completed_at.is_some())
                .max_by_key(|r| r.completed_at);
            if let Some(run) = latest {
                self.runs.save_run(scope, run).await.map_err(SyncError::Local)?;
                info!("Hydrated run {} of {} from mirror", run.run_id, survey_id);
                hydrated.push(run.clone());
            }
        }
        Ok(hydrated)
    }

    async fn push_or_queue(&self, scope: &OwnerScope, run: &ResponseState) -> bool {
        match self.mirror.push_run(scope, run).await {
            Ok(()) => true,
            Err(e) => {
                let item = PendingSync::Push {
                    scope: scope.clone(),
                    run_id: run.run_id.clone(),
                };
                self.record_failure(scope, item, &e).await;
                false
            }
        }
    }

    async fn record_failure(&self, scope: &OwnerScope, item: PendingSync, error: &RepositoryError) {
        record_mirror_failure(&self.queue, self.activity.as_ref(), scope, item, error).await;
    }
}

/// Warn, log and queue a failed mirror write.
pub(crate) async fn record_mirror_failure(
    queue: &SyncQueue,
    activity: &dyn ActivityLogger,
    scope: &OwnerScope,
    item: PendingSync,
    error: &RepositoryError,
) {
    warn!("Mirror write for run {} failed: {}", item.run_id(), error);
    activity.log(ActivityEvent::new(
        "mirror_failed",
        serde_json::json!({
            "owner": scope.bucket_key(),
            "runId": item.run_id(),
            "error": error.to_string(),
        }),
    ));
    queue.enqueue(item).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::run_repository::RunRepository;
    use crate::use_cases::testing::{FlakyMirror, MemRuns, RecordingLog};

    fn completed(run_id: &str, survey_id: &str, started: u64, completed: u64) -> ResponseState {
        let mut run = ResponseState::start(run_id, survey_id, started);
        run.answers.insert("p1".to_string(), 3.0);
        run.completed_at = Some(completed);
        run
    }

    struct Fixture {
        runs: Arc<MemRuns>,
        mirror: Arc<FlakyMirror>,
        queue: Arc<SyncQueue>,
        log: Arc<RecordingLog>,
        uc: SyncRunsUseCase,
    }

    fn fixture(mirror: FlakyMirror) -> Fixture {
        let runs = Arc::new(MemRuns::default());
        let mirror = Arc::new(mirror);
        let queue = Arc::new(SyncQueue::new());
        let log = Arc::new(RecordingLog::default());
        let uc = SyncRunsUseCase::new(runs.clone(), mirror.clone(), queue.clone())
            .with_activity_logger(log.clone());
        Fixture {
            runs,
            mirror,
            queue,
            log,
            uc,
        }
    }

    // ==================== Queue ====================

    #[tokio::test]
    async fn test_queue_keeps_latest_op_per_run() {
        let queue = SyncQueue::new();
        let scope = OwnerScope::Anonymous;
        queue
            .enqueue(PendingSync::Push { scope: scope.clone(), run_id: "r1".into() })
            .await;
        queue
            .enqueue(PendingSync::Push { scope: scope.clone(), run_id: "r2".into() })
            .await;
        queue
            .enqueue(PendingSync::Remove { scope: scope.clone(), run_id: "r1".into() })
            .await;

        let drained = queue.drain().await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].run_id(), "r2");
        assert!(matches!(drained[1], PendingSync::Remove { .. }));
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_queue_distinguishes_scopes() {
        let queue = SyncQueue::new();
        queue
            .enqueue(PendingSync::Push { scope: OwnerScope::Anonymous, run_id: "r1".into() })
            .await;
        queue
            .enqueue(PendingSync::Push { scope: OwnerScope::User("u1".into()), run_id: "r1".into() })
            .await;
        assert_eq!(queue.len().await, 2);
    }

    // ==================== Sync All / Latest ====================

    #[tokio::test]
    async fn test_sync_all_pushes_every_run() {
        let f = fixture(FlakyMirror::default());
        let scope = OwnerScope::User("u1".into());
        f.runs.save_run(&scope, &completed("r1", "s1", 1, 2)).await.unwrap();
        f.runs.save_run(&scope, &ResponseState::start("r2", "s1", 3)).await.unwrap();

        let report = f.uc.sync_all(&scope).await.unwrap();

        assert_eq!(report.pushed, 2);
        assert!(report.is_clean());
        assert!(f.mirror.holds(&scope, "r1").is_some());
        assert!(f.mirror.holds(&scope, "r2").is_some());
        assert_eq!(f.log.types(), vec!["sync_completed"]);
    }

    #[tokio::test]
    async fn test_sync_all_offline_queues_failures() {
        let f = fixture(FlakyMirror::offline());
        let scope = OwnerScope::Anonymous;
        f.runs.save_run(&scope, &completed("r1", "s1", 1, 2)).await.unwrap();

        let report = f.uc.sync_all(&scope).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(f.queue.len().await, 1);
        assert_eq!(f.log.types(), vec!["mirror_failed", "sync_completed"]);
    }

    #[tokio::test]
    async fn test_sync_latest_picks_newest_started() {
        let f = fixture(FlakyMirror::default());
        let scope = OwnerScope::Anonymous;
        f.runs.save_run(&scope, &completed("r_old", "s1", 1, 2)).await.unwrap();
        f.runs.save_run(&scope, &ResponseState::start("r_new", "s1", 10)).await.unwrap();
        f.runs.save_run(&scope, &ResponseState::start("r_other", "s2", 20)).await.unwrap();

        let pushed = f.uc.sync_latest(&scope, "s1").await.unwrap();

        assert_eq!(pushed.as_deref(), Some("r_new"));
        assert!(f.mirror.holds(&scope, "r_old").is_none());
        assert_eq!(f.uc.sync_latest(&scope, "s_none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sync_latest_failure_is_returned_and_queued() {
        let f = fixture(FlakyMirror::offline());
        let scope = OwnerScope::Anonymous;
        f.runs.save_run(&scope, &ResponseState::start("r1", "s1", 1)).await.unwrap();

        let err = f.uc.sync_latest(&scope, "s1").await.unwrap_err();

        assert!(matches!(err, SyncError::Mirror(_)));
        assert_eq!(f.queue.len().await, 1);
    }

    // ==================== Retry ====================

    #[tokio::test]
    async fn test_retry_pending_drains_when_back_online() {
        let f = fixture(FlakyMirror::offline());
        let scope = OwnerScope::Anonymous;
        f.runs.save_run(&scope, &completed("r1", "s1", 1, 2)).await.unwrap();
        f.uc.sync_all(&scope).await.unwrap();

        let still_offline = f.uc.retry_pending().await;
        assert_eq!(still_offline.failed, 1);
        assert_eq!(f.queue.len().await, 1);

        f.mirror.set_offline(false);
        let report = f.uc.retry_pending().await;

        assert_eq!(report.pushed, 1);
        assert!(f.queue.is_empty().await);
        assert!(f.mirror.holds(&scope, "r1").is_some());
    }

    #[tokio::test]
    async fn test_retry_drops_runs_removed_locally() {
        let f = fixture(FlakyMirror::default());
        let scope = OwnerScope::Anonymous;
        f.queue
            .enqueue(PendingSync::Push { scope: scope.clone(), run_id: "r_gone".into() })
            .await;

        let report = f.uc.retry_pending().await;

        assert_eq!(report.dropped, 1);
        assert!(f.queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_retry_replays_removals() {
        let f = fixture(FlakyMirror::default());
        let scope = OwnerScope::Anonymous;
        f.mirror.push_run(&scope, &ResponseState::start("r1", "s1", 1)).await.unwrap();
        f.queue
            .enqueue(PendingSync::Remove { scope: scope.clone(), run_id: "r1".into() })
            .await;

        let report = f.uc.retry_pending().await;

        assert_eq!(report.removed, 1);
        assert!(f.mirror.holds(&scope, "r1").is_none());
    }

    // ==================== Hydrate ====================

    #[tokio::test]
    async fn test_hydrate_copies_latest_completed_when_missing_locally() {
        let f = fixture(FlakyMirror::default());
        let scope = OwnerScope::User("u1".into());
        f.mirror.push_run(&scope, &completed("r_a", "s1", 1, 5)).await.unwrap();
        f.mirror.push_run(&scope, &completed("r_b", "s1", 2, 9)).await.unwrap();
        f.mirror.push_run(&scope, &ResponseState::start("r_c", "s1", 3)).await.unwrap();

        let hydrated = f
            .uc
            .hydrate_latest_completed(&scope, &["s1".to_string(), "s2".to_string()])
            .await
            .unwrap();

        assert_eq!(hydrated.len(), 1);
        assert_eq!(hydrated[0].run_id, "r_b");
        assert!(f.runs.get_run(&scope, "r_b").await.unwrap().is_some());
        assert_eq!(f.runs.count(&scope), 1);
    }

    #[tokio::test]
    async fn test_hydrate_skips_blueprints_with_local_completed_run() {
        let f = fixture(FlakyMirror::offline());
        let scope = OwnerScope::Anonymous;
        f.runs.save_run(&scope, &completed("r_local", "s1", 1, 2)).await.unwrap();

        // The mirror is never contacted, so being offline is not an error.
        let hydrated = f
            .uc
            .hydrate_latest_completed(&scope, &["s1".to_string()])
            .await
            .unwrap();
        assert!(hydrated.is_empty());
    }
}
