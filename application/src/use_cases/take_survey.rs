//! Take survey use case
//!
//! Drives one owner's run through a blueprint: open (resume or create),
//! record answers, navigate, finish, reassess and attach a focus selection.
//!
//! Storage is local-first. Every change is saved to the [`RunStore`] before
//! the in-memory [`RunSession`] moves on; the [`RunMirror`] is written
//! afterwards and its failures are only warned about, logged and queued
//! in the [`SyncQueue`] so local progress is never reverted.

use super::sync_runs::{PendingSync, SyncQueue, record_mirror_failure};
use crate::config::SurveyBehavior;
use crate::ports::activity_log::{ActivityEvent, ActivityLogger, NoActivityLog};
use crate::ports::clock::Clock;
use crate::ports::run_mirror::{NoMirror, RunMirror};
use crate::ports::run_repository::{RepositoryError, RunStore};
use crate::ports::survey_repository::SurveyRepository;
use selfcheck_domain::run::lifecycle;
use selfcheck_domain::{
    DomainError, FocusState, ForwardAction, OwnerScope, Prompt, ResponseState, ResultSummary,
    RunCursor, RunStatus, SurveyBlueprint, ValidationIssue, compute_summary, validate_answer,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Survey not found: {0}")]
    SurveyNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid answer: {0}")]
    InvalidAnswer(ValidationIssue),

    #[error("No current prompt to answer")]
    NoCurrentPrompt,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RunError {
    /// Whether the error should be rendered as a not-found state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RunError::SurveyNotFound(_) | RunError::RunNotFound(_))
    }
}

/// An open run together with its blueprint and view position.
#[derive(Debug, Clone)]
pub struct RunSession {
    pub survey: SurveyBlueprint,
    pub run: ResponseState,
    pub cursor: RunCursor,
    /// True when an existing in-progress run was picked up.
    pub resumed: bool,
}

impl RunSession {
    fn new(survey: SurveyBlueprint, run: ResponseState, resumed: bool) -> Self {
        let cursor = RunCursor::resume(&run, &survey);
        Self {
            survey,
            run,
            cursor,
            resumed,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run.run_id
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.cursor.current_prompt(&self.survey)
    }

    pub fn current_value(&self) -> Option<f64> {
        self.cursor.current_value(&self.run, &self.survey)
    }

    /// 1-based position and total, for "3 / 10" style display.
    pub fn position(&self) -> (usize, usize) {
        (self.cursor.position(&self.survey), self.survey.prompt_count())
    }

    pub fn status(&self) -> RunStatus {
        lifecycle::status(&self.run, &self.survey)
    }

    pub fn forward_action(&self) -> ForwardAction {
        self.cursor.forward_action(&self.survey)
    }

    pub fn summary(&self) -> ResultSummary {
        compute_summary(&self.survey, &self.run.answers)
    }

    pub fn can_go_next(&self) -> bool {
        self.cursor.can_go_next(&self.run, &self.survey)
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor.can_go_back()
    }

    /// Move to the next prompt; requires the current one to be answered.
    pub fn go_next(&mut self) -> bool {
        self.cursor.go_next(&self.run, &self.survey)
    }

    pub fn go_back(&mut self) -> bool {
        self.cursor.go_back()
    }
}

pub struct TakeSurveyUseCase {
    surveys: Arc<dyn SurveyRepository>,
    runs: Arc<dyn RunStore>,
    clock: Arc<dyn Clock>,
    mirror: Arc<dyn RunMirror>,
    queue: Arc<SyncQueue>,
    activity: Arc<dyn ActivityLogger>,
    behavior: SurveyBehavior,
}

impl TakeSurveyUseCase {
    pub fn new(
        surveys: Arc<dyn SurveyRepository>,
        runs: Arc<dyn RunStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            surveys,
            runs,
            clock,
            mirror: Arc::new(NoMirror),
            queue: Arc::new(SyncQueue::new()),
            activity: Arc::new(NoActivityLog),
            behavior: SurveyBehavior::default(),
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

    pub fn with_behavior(mut self, behavior: SurveyBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn behavior(&self) -> &SurveyBehavior {
        &self.behavior
    }

    /// Open a run for a blueprint.
    ///
    /// The most recently started in-progress run is resumed; a completed run
    /// is never reused. Without an in-progress run a new one is created.
    pub async fn open(&self, scope: &OwnerScope, survey_id: &str) -> Result<RunSession, RunError> {
        let survey = self.load_survey(survey_id).await?;

        let existing = self
            .runs
            .list_runs_by_survey(scope, survey_id)
            .await?
            .into_iter()
            .find(|r| !r.is_finished());

        if let Some(run) = existing {
            info!("Resuming run {} of {}", run.run_id, survey_id);
            self.log_run("run_resumed", scope, &run);
            return Ok(RunSession::new(survey, run, true));
        }

        self.start(scope, survey).await
    }

    /// Start a brand-new run, leaving earlier runs untouched.
    pub async fn reassess(&self, scope: &OwnerScope, survey_id: &str) -> Result<RunSession, RunError> {
        let survey = self.load_survey(survey_id).await?;
        self.start(scope, survey).await
    }

    /// Record `value` for the session's current prompt.
    ///
    /// The value must be finite and within the blueprint scale. When this
    /// answer completes the run, `completedAt` is stamped. The session is
    /// updated only after the local save succeeded.
    pub async fn record_answer(
        &self,
        scope: &OwnerScope,
        session: &mut RunSession,
        value: f64,
    ) -> Result<RunStatus, RunError> {
        let prompt_id = session
            .current_prompt()
            .map(|p| p.prompt_id.clone())
            .ok_or(RunError::NoCurrentPrompt)?;
        self.answer(scope, session, &prompt_id, value).await
    }

    /// Record `value` for an explicit prompt and move the cursor there.
    pub async fn answer_prompt(
        &self,
        scope: &OwnerScope,
        session: &mut RunSession,
        prompt_id: &str,
        value: f64,
    ) -> Result<RunStatus, RunError> {
        let index = session
            .survey
            .prompt_index(prompt_id)
            .ok_or_else(|| DomainError::UnknownPrompt(prompt_id.to_string()))?;
        let status = self.answer(scope, session, prompt_id, value).await?;
        session.cursor = RunCursor::at(index);
        Ok(status)
    }

    async fn answer(
        &self,
        scope: &OwnerScope,
        session: &mut RunSession,
        prompt_id: &str,
        value: f64,
    ) -> Result<RunStatus, RunError> {
        if let Some(issue) = validate_answer(&session.survey.scale, value) {
            return Err(RunError::InvalidAnswer(issue));
        }

        let was_finished = session.run.is_finished();
        let next = lifecycle::record_answer(&session.run, prompt_id, value);
        let next = lifecycle::complete_if_done(next, &session.survey, self.clock.now_millis());

        self.runs.save_run(scope, &next).await?;
        session.run = next;
        debug!("Recorded {} = {} in run {}", prompt_id, value, session.run.run_id);

        self.activity.log(ActivityEvent::new(
            "answer_recorded",
            serde_json::json!({
                "owner": scope.bucket_key(),
                "runId": session.run.run_id,
                "promptId": prompt_id,
                "value": value,
            }),
        ));
        if !was_finished && session.run.is_finished() {
            info!("Run {} completed", session.run.run_id);
            self.log_run("run_completed", scope, &session.run);
        }

        self.mirror_run(scope, &session.run).await;
        Ok(session.status())
    }

    /// Mark the run finished. Idempotent: an existing `completedAt` is kept
    /// and nothing is written again. A run with unanswered prompts cannot be
    /// finished.
    pub async fn finish(&self, scope: &OwnerScope, session: &mut RunSession) -> Result<(), RunError> {
        if session.run.is_finished() {
            return Ok(());
        }
        if session.status() != RunStatus::Complete {
            return Err(DomainError::RunNotComplete(session.run_id().to_string()).into());
        }
        let next = lifecycle::finish(session.run.clone(), self.clock.now_millis());
        self.runs.save_run(scope, &next).await?;
        session.run = next;

        info!("Run {} finished", session.run.run_id);
        self.log_run("run_completed", scope, &session.run);
        self.mirror_run(scope, &session.run).await;
        Ok(())
    }

    /// A fresh focus selection using the configured budget.
    pub fn new_focus(&self) -> FocusState {
        FocusState::default().with_budget(self.behavior.focus_budget)
    }

    /// Attach a focus selection to a completed run.
    ///
    /// Categories must exist in the blueprint and the point allocation must
    /// fit its budget; otherwise nothing is saved.
    pub async fn set_focus(
        &self,
        scope: &OwnerScope,
        run_id: &str,
        focus: FocusState,
    ) -> Result<ResponseState, RunError> {
        let mut run = self
            .runs
            .get_run(scope, run_id)
            .await?
            .ok_or_else(|| RunError::RunNotFound(run_id.to_string()))?;
        if !run.is_finished() {
            return Err(DomainError::RunNotComplete(run_id.to_string()).into());
        }
        let survey = self.load_survey(&run.survey_id).await?;
        focus.check_categories(&survey)?;
        focus.check_budget()?;

        run.focus = Some(focus);
        self.runs.save_run(scope, &run).await?;
        info!("Saved focus selection on run {}", run_id);
        self.log_run("focus_saved", scope, &run);
        self.mirror_run(scope, &run).await;
        Ok(run)
    }

    async fn load_survey(&self, survey_id: &str) -> Result<SurveyBlueprint, RunError> {
        self.surveys
            .get(survey_id)
            .await?
            .ok_or_else(|| RunError::SurveyNotFound(survey_id.to_string()))
    }

    async fn start(&self, scope: &OwnerScope, survey: SurveyBlueprint) -> Result<RunSession, RunError> {
        let run = self
            .runs
            .create_run(scope, &survey.survey_id, self.clock.now_millis())
            .await?;
        info!("Created run {} of {} for {}", run.run_id, survey.survey_id, scope);
        self.log_run("run_created", scope, &run);
        self.mirror_run(scope, &run).await;
        Ok(RunSession::new(survey, run, false))
    }

    async fn mirror_run(&self, scope: &OwnerScope, run: &ResponseState) {
        if let Err(e) = self.mirror.push_run(scope, run).await {
            let item = PendingSync::Push {
                scope: scope.clone(),
                run_id: run.run_id.clone(),
            };
            record_mirror_failure(&self.queue, self.activity.as_ref(), scope, item, &e).await;
        }
    }

    fn log_run(&self, event_type: &'static str, scope: &OwnerScope, run: &ResponseState) {
        self.activity.log(ActivityEvent::new(
            event_type,
            serde_json::json!({
                "owner": scope.bucket_key(),
                "runId": run.run_id,
                "surveyId": run.survey_id,
                "completedAt": run.completed_at,
            }),
        ));
    }
}
