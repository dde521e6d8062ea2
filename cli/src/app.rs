//! Command dispatch
//!
//! Holds the wired adapters and builds one use case per command.

use anyhow::{Context, Result, anyhow, bail};
use selfcheck_application::{
    ActivityLogger, Clock, NoActivityLog, RunMirror, RunStore, SaveSurveyError,
    SaveSurveyUseCase, SurveyBehavior, SurveyEditor, SurveyMirror, SurveyRepository, SyncQueue,
    SyncReport, SyncRunsUseCase, TakeSurveyUseCase, ViewResultsUseCase,
};
use selfcheck_domain::{
    Category, FocusMode, FocusState, Id, OwnerScope, Prompt, Scale, SurveyBlueprint,
    ValidationIssue, validate_survey,
};
use selfcheck_presentation::{
    Command, ConsoleFormatter, EditCommand, FocusCommand, OutputConfig, TakeRepl,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct App {
    pub scope: OwnerScope,
    pub output: OutputConfig,
    pub surveys: Arc<dyn SurveyRepository>,
    pub runs: Arc<dyn RunStore>,
    pub clock: Arc<dyn Clock>,
    pub mirror: Option<Arc<dyn RunMirror>>,
    pub survey_mirror: Option<Arc<dyn SurveyMirror>>,
    pub queue: Arc<SyncQueue>,
    pub activity: Arc<dyn ActivityLogger>,
    pub behavior: SurveyBehavior,
}

impl App {
    pub fn new(
        scope: OwnerScope,
        output: OutputConfig,
        surveys: Arc<dyn SurveyRepository>,
        runs: Arc<dyn RunStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            scope,
            output,
            surveys,
            runs,
            clock,
            mirror: None,
            survey_mirror: None,
            queue: Arc::new(SyncQueue::new()),
            activity: Arc::new(NoActivityLog),
            behavior: SurveyBehavior::default(),
        }
    }

    pub fn with_mirror(mut self, mirror: Option<Arc<dyn RunMirror>>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_survey_mirror(mut self, mirror: Option<Arc<dyn SurveyMirror>>) -> Self {
        self.survey_mirror = mirror;
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

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Surveys => {
                let surveys = self.surveys.list().await?;
                self.emit(&surveys, || ConsoleFormatter::format_survey_list(&surveys));
            }
            Command::Show { survey_id } => {
                let survey = self.require_survey(&survey_id).await?;
                self.emit(&survey, || ConsoleFormatter::format_survey(&survey));
            }
            Command::Validate { file } => self.validate(&file).await?,
            Command::Import { file } => self.import(&file).await?,
            Command::Seed => {
                let seeded = self.save_use_case().seed_if_empty().await?;
                if seeded {
                    println!("Stored the default blueprint.");
                } else {
                    println!("Blueprints already exist; nothing seeded.");
                }
            }
            Command::Edit { survey_id, edit } => self.edit(&survey_id, edit).await?,
            Command::Take {
                survey_id,
                reassess,
            } => self.take(&survey_id, reassess).await?,
            Command::Answer {
                survey_id,
                prompt_id,
                value,
            } => self.answer(&survey_id, &prompt_id, value).await?,
            Command::Results { run_id, latest } => self.results(run_id, latest).await?,
            Command::Runs { survey } => {
                let runs = self
                    .view_use_case()
                    .history(&self.scope, survey.as_deref())
                    .await?;
                self.emit(&runs, || ConsoleFormatter::format_history(&runs));
            }
            Command::Focus { run_id, selection } => self.focus(&run_id, selection).await?,
            Command::RemoveRun { run_id } => {
                let existed = self.view_use_case().remove_run(&self.scope, &run_id).await?;
                self.flush_pending().await;
                if !existed {
                    bail!("Run not found: {}", run_id);
                }
                println!("Removed run {}", run_id);
            }
            Command::Sync { survey, hydrate } => self.sync(survey.as_deref(), hydrate).await?,
            Command::Pull { survey_id } => self.pull(&survey_id).await?,
            Command::ShowConfig => {}
        }
        Ok(())
    }

    // ==================== Blueprints ====================

    async fn validate(&self, file: &Path) -> Result<()> {
        let survey = read_blueprint(file).await?;
        let result = validate_survey(&survey);
        self.emit(&result, || ConsoleFormatter::format_issues(result.issues()));
        if !result.is_ok() {
            bail!("{} is not a valid blueprint", file.display());
        }
        Ok(())
    }

    async fn import(&self, file: &Path) -> Result<()> {
        let survey = read_blueprint(file).await?;
        match self.save_use_case().save(&survey).await {
            Ok(()) => {
                println!("Saved blueprint {}", survey.survey_id);
                Ok(())
            }
            Err(SaveSurveyError::Invalid(issues)) => self.reject(&issues),
            Err(e) => Err(e.into()),
        }
    }

    async fn edit(&self, survey_id: &str, edit: EditCommand) -> Result<()> {
        let mut editor = SurveyEditor::load(self.surveys.clone(), self.clock.clone(), survey_id)
            .await?
            .ok_or_else(|| anyhow!("Survey not found: {}", survey_id))?;

        match edit {
            EditCommand::Title { title } => editor.set_title(title),
            EditCommand::Scale { min, max, step } => editor.set_scale(Scale::new(min, max, step)),
            EditCommand::AddCategory { category_id, label } => {
                editor.add_category(Category::new(category_id, label))
            }
            EditCommand::AddPrompt {
                prompt_id,
                category_id,
                text,
                help,
            } => {
                let prompt = Prompt::new(prompt_id, category_id, text);
                editor.add_prompt(match help {
                    Some(help) => prompt.with_help_text(help),
                    None => prompt,
                });
            }
            EditCommand::RemovePrompt { prompt_id } => {
                if !editor.remove_prompt(&prompt_id) {
                    bail!("Prompt not found: {}", prompt_id);
                }
            }
            EditCommand::MovePrompt {
                prompt_id,
                position,
            } => {
                if !editor.move_prompt(&prompt_id, position.saturating_sub(1)) {
                    bail!("Prompt not found: {}", prompt_id);
                }
            }
        }

        match editor.save().await {
            Ok(_) => {
                info!("Edited blueprint {}", survey_id);
                self.save_use_case().publish(editor.draft()).await;
                self.emit(editor.draft(), || ConsoleFormatter::format_survey(editor.draft()));
                Ok(())
            }
            Err(SaveSurveyError::Invalid(issues)) => self.reject(&issues),
            Err(e) => Err(e.into()),
        }
    }

    async fn pull(&self, survey_id: &str) -> Result<()> {
        if self.survey_mirror.is_none() {
            bail!("No mirror configured; set [storage] mirror_dir");
        }
        match self.save_use_case().pull(survey_id).await {
            Ok(Some(survey)) => {
                self.emit(&survey, || format!("Pulled blueprint {}\n", survey.survey_id));
                Ok(())
            }
            Ok(None) => bail!("Survey {} is not in the mirror", survey_id),
            Err(SaveSurveyError::Invalid(issues)) => self.reject(&issues),
            Err(e) => Err(e.into()),
        }
    }

    fn reject(&self, issues: &[ValidationIssue]) -> Result<()> {
        self.emit(issues, || ConsoleFormatter::format_issues(issues));
        bail!("Blueprint rejected; nothing was saved")
    }

    // ==================== Runs ====================

    async fn take(&self, survey_id: &str, reassess: bool) -> Result<()> {
        let take = self.take_use_case();
        let session = if reassess {
            take.reassess(&self.scope, survey_id).await?
        } else {
            take.open(&self.scope, survey_id).await?
        };

        let mut repl = TakeRepl::new(take, self.scope.clone());
        if let Some(sync) = self.sync_use_case() {
            repl = repl.with_sync(sync);
        }
        let session = repl.run(session).await?;
        debug!("Left run {} as {}", session.run_id(), session.status());
        Ok(())
    }

    async fn answer(&self, survey_id: &str, prompt_id: &str, value: f64) -> Result<()> {
        let take = self.take_use_case();
        let mut session = take.open(&self.scope, survey_id).await?;
        let status = take
            .answer_prompt(&self.scope, &mut session, prompt_id, value)
            .await?;

        self.flush_pending().await;

        let summary = session.summary();
        self.emit(&session.run, || {
            format!(
                "Recorded {} = {} in run {} ({}, {}/{} answered)\n",
                prompt_id,
                value,
                session.run_id(),
                status,
                summary.answered_count,
                summary.total_count
            )
        });
        Ok(())
    }

    async fn focus(&self, run_id: &str, selection: FocusCommand) -> Result<()> {
        let take = self.take_use_case();
        let focus = match selection {
            FocusCommand::Rank { categories } => {
                rank_focus(take.new_focus(), &categories, self.behavior.focus_rank_limit)?
            }
            FocusCommand::Points { allocations } => points_focus(take.new_focus(), &allocations)?,
        };

        let run = take.set_focus(&self.scope, run_id, focus).await?;
        self.flush_pending().await;
        let survey = self.require_survey(&run.survey_id).await?;
        self.emit(&run, || match &run.focus {
            Some(focus) => ConsoleFormatter::format_focus(&survey, focus),
            None => String::new(),
        });
        Ok(())
    }

    async fn results(&self, run_id: Option<String>, latest: Option<String>) -> Result<()> {
        let view = self.view_use_case();
        let results = match (run_id, latest) {
            (Some(run_id), _) => view.results(&self.scope, &run_id).await?,
            (None, Some(survey_id)) => view
                .latest_results(&self.scope, &survey_id)
                .await?
                .ok_or_else(|| anyhow!("No completed run of {}", survey_id))?,
            (None, None) => bail!("Give a run id or --latest <SURVEY_ID>"),
        };
        self.emit(&results, || ConsoleFormatter::format_results(&results));
        Ok(())
    }

    /// Replay mirror writes queued during this invocation before it exits.
    async fn flush_pending(&self) {
        let Some(sync) = self.sync_use_case() else {
            return;
        };
        let report = sync.retry_pending().await;
        if !report.is_clean() {
            warn!("{} mirror write(s) still pending", report.failed);
        }
    }

    async fn sync(&self, survey_id: Option<&str>, hydrate: bool) -> Result<()> {
        let sync = self
            .sync_use_case()
            .ok_or_else(|| anyhow!("No mirror configured; set [storage] mirror_dir"))?;

        let retried = sync.retry_pending().await;
        debug!("Retried {} queued write(s)", retried.pushed + retried.removed);

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SyncOutput {
            report: Option<SyncReport>,
            latest_run_id: Option<Id>,
            hydrated: Vec<Id>,
        }
        let mut out = SyncOutput {
            report: None,
            latest_run_id: None,
            hydrated: Vec::new(),
        };

        match survey_id {
            Some(id) => out.latest_run_id = sync.sync_latest(&self.scope, id).await?,
            None => out.report = Some(sync.sync_all(&self.scope).await?),
        }

        if hydrate {
            let survey_ids: Vec<Id> = self
                .surveys
                .list()
                .await?
                .into_iter()
                .map(|s| s.survey_id)
                .collect();
            out.hydrated = sync
                .hydrate_latest_completed(&self.scope, &survey_ids)
                .await?
                .into_iter()
                .map(|r| r.run_id)
                .collect();
        }

        self.emit(&out, || {
            let mut text = String::new();
            if let Some(report) = &out.report {
                text.push_str(&ConsoleFormatter::format_sync_report(report));
            }
            match (&out.latest_run_id, survey_id) {
                (Some(run_id), _) => text.push_str(&format!("Pushed run {}\n", run_id)),
                (None, Some(id)) => text.push_str(&format!("No runs of {} to push\n", id)),
                (None, None) => {}
            }
            if hydrate {
                text.push_str(&format!("Hydrated {} run(s) from the mirror\n", out.hydrated.len()));
            }
            text
        });
        Ok(())
    }

    // ==================== Wiring ====================

    pub fn save_use_case(&self) -> SaveSurveyUseCase {
        let save = SaveSurveyUseCase::new(self.surveys.clone())
            .with_activity_logger(self.activity.clone());
        match &self.survey_mirror {
            Some(mirror) => save.with_mirror(mirror.clone()),
            None => save,
        }
    }

    fn take_use_case(&self) -> TakeSurveyUseCase {
        let take = TakeSurveyUseCase::new(self.surveys.clone(), self.runs.clone(), self.clock.clone())
            .with_activity_logger(self.activity.clone())
            .with_behavior(self.behavior.clone());
        match &self.mirror {
            Some(mirror) => take.with_mirror(mirror.clone(), self.queue.clone()),
            None => take,
        }
    }

    fn view_use_case(&self) -> ViewResultsUseCase {
        let view = ViewResultsUseCase::new(self.surveys.clone(), self.runs.clone())
            .with_activity_logger(self.activity.clone());
        match &self.mirror {
            Some(mirror) => view.with_mirror(mirror.clone(), self.queue.clone()),
            None => view,
        }
    }

    fn sync_use_case(&self) -> Option<SyncRunsUseCase> {
        self.mirror.as_ref().map(|mirror| {
            SyncRunsUseCase::new(self.runs.clone(), mirror.clone(), self.queue.clone())
                .with_activity_logger(self.activity.clone())
        })
    }

    async fn require_survey(&self, survey_id: &str) -> Result<SurveyBlueprint> {
        self.surveys
            .get(survey_id)
            .await?
            .ok_or_else(|| anyhow!("Survey not found: {}", survey_id))
    }

    /// Print JSON or the text rendering, depending on the output format.
    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) {
        if self.output.is_json() {
            println!("{}", ConsoleFormatter::format_json(value));
        } else {
            print!("{}", text());
        }
    }
}

async fn read_blueprint(file: &Path) -> Result<SurveyBlueprint> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not blueprint JSON", file.display()))
}

/// Rank mode selection from an ordered list of category ids.
fn rank_focus(base: FocusState, categories: &[String], limit: usize) -> Result<FocusState> {
    if categories.len() > limit {
        bail!("At most {} categories can be ranked", limit);
    }
    let mut focus = base.with_mode(FocusMode::Rank);
    for (i, category) in categories.iter().enumerate() {
        if categories[..i].contains(category) {
            bail!("Category ranked twice: {}", category);
        }
        focus = focus.rank_click(category, limit);
    }
    Ok(focus)
}

/// Points mode selection. The allocation must fit the budget.
fn points_focus(base: FocusState, allocations: &[(String, f64)]) -> Result<FocusState> {
    let focus = allocations
        .iter()
        .fold(base.with_mode(FocusMode::Points), |focus, (category, points)| {
            focus.set_points(category, *points)
        });
    focus.check_budget()?;
    Ok(focus)
}
