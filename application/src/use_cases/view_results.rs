//! Results and run history
//!
//! Read side of runs: the summary of one run, the list of runs of an owner
//! and run removal.

use super::sync_runs::{PendingSync, SyncQueue, record_mirror_failure};
use crate::ports::activity_log::{ActivityEvent, ActivityLogger, NoActivityLog};
use crate::ports::run_mirror::{NoMirror, RunMirror};
use crate::ports::run_repository::{RepositoryError, RunStore};
use crate::ports::survey_repository::SurveyRepository;
use selfcheck_domain::run::lifecycle;
use selfcheck_domain::{
    Id, OwnerScope, ResponseState, ResultSummary, RunStatus, SurveyBlueprint, Timestamp,
    compute_summary,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Run not found: {0}")]
    RunNotFound(String),

    /// The run exists but its blueprint was removed.
    #[error("Survey {survey_id} of run {run_id} not found")]
    SurveyNotFound { run_id: String, survey_id: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A run with its blueprint and derived figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub run: ResponseState,
    pub survey: SurveyBlueprint,
    pub status: RunStatus,
    pub summary: ResultSummary,
}

/// One line of the run history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOverview {
    pub run_id: Id,
    pub survey_id: Id,
    /// `None` when the blueprint no longer exists.
    pub survey_title: Option<String>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub answered_count: usize,
    pub total_count: usize,
    pub overall_avg: Option<f64>,
}

pub struct ViewResultsUseCase {
    surveys: Arc<dyn SurveyRepository>,
    runs: Arc<dyn RunStore>,
    mirror: Arc<dyn RunMirror>,
    queue: Arc<SyncQueue>,
    activity: Arc<dyn ActivityLogger>,
}

impl ViewResultsUseCase {
    pub fn new(surveys: Arc<dyn SurveyRepository>, runs: Arc<dyn RunStore>) -> Self {
        Self {
            surveys,
            runs,
            mirror: Arc::new(NoMirror),
            queue: Arc::new(SyncQueue::new()),
            activity: Arc::new(NoActivityLog),
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn RunMirror>, queue: Arc<SyncQueue>) -> Self {
        self.mirror = mirror;
        self.queue = queue;
        self
    }

    pub fn with_activity_logger(mut self, activity: Arc<dyn ActivityLogger>) -> Self {
        self.activity = activity;
        self
    }

    /// Summary of one run against its blueprint.
    pub async fn results(&self, scope: &OwnerScope, run_id: &str) -> Result<RunResults, ResultsError> {
        let run = self
            .runs
            .get_run(scope, run_id)
            .await?
            .ok_or_else(|| ResultsError::RunNotFound(run_id.to_string()))?;
        let survey = self.surveys.get(&run.survey_id).await?.ok_or_else(|| {
            ResultsError::SurveyNotFound {
                run_id: run.run_id.clone(),
                survey_id: run.survey_id.clone(),
            }
        })?;

        Ok(RunResults {
            status: lifecycle::status(&run, &survey),
            summary: compute_summary(&survey, &run.answers),
            run,
            survey,
        })
    }

    /// Latest completed run of a blueprint, with its results.
    pub async fn latest_results(
        &self,
        scope: &OwnerScope,
        survey_id: &str,
    ) -> Result<Option<RunResults>, ResultsError> {
        match self.runs.latest_completed_run(scope, survey_id).await? {
            Some(run) => self.results(scope, &run.run_id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Runs of the scope, newest `startedAt` first, optionally for one blueprint.
    pub async fn history(
        &self,
        scope: &OwnerScope,
        survey_id: Option<&str>,
    ) -> Result<Vec<RunOverview>, ResultsError> {
        let mut runs = match survey_id {
            Some(id) => self.runs.list_runs_by_survey(scope, id).await?,
            None => self.runs.list_runs(scope).await?,
        };
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at).then(b.run_id.cmp(&a.run_id)));

        let surveys: HashMap<Id, SurveyBlueprint> = self
            .surveys
            .list()
            .await?
            .into_iter()
            .map(|s| (s.survey_id.clone(), s))
            .collect();

        Ok(runs
            .into_iter()
            .map(|run| {
                let survey = surveys.get(&run.survey_id);
                let summary = survey.map(|s| compute_summary(s, &run.answers));
                RunOverview {
                    survey_title: survey.map(|s| s.title.clone()),
                    answered_count: summary.as_ref().map_or(run.answers.len(), |s| s.answered_count),
                    total_count: summary.as_ref().map_or(0, |s| s.total_count),
                    overall_avg: summary.and_then(|s| s.overall_avg),
                    run_id: run.run_id,
                    survey_id: run.survey_id,
                    started_at: run.started_at,
                    completed_at: run.completed_at,
                }
            })
            .collect())
    }

    /// Delete a run locally, then from the mirror.
    ///
    /// Returns whether the run existed locally.
    pub async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<bool, ResultsError> {
        let existed = self.runs.get_run(scope, run_id).await?.is_some();
        self.runs.remove_run(scope, run_id).await?;

        if let Err(e) = self.mirror.remove_run(scope, run_id).await {
            let item = PendingSync::Remove {
                scope: scope.clone(),
                run_id: run_id.to_string(),
            };
            record_mirror_failure(&self.queue, self.activity.as_ref(), scope, item, &e).await;
        }

        if existed {
            info!("Removed run {} for {}", run_id, scope);
            self.activity.log(ActivityEvent::new(
                "run_removed",
                serde_json::json!({ "owner": scope.bucket_key(), "runId": run_id }),
            ));
        }
        Ok(existed)
    }
}
