//! In-memory port implementations shared by the use case tests.

use crate::ports::activity_log::{ActivityEvent, ActivityLogger};
use crate::ports::run_mirror::RunMirror;
use crate::ports::run_repository::{RepositoryError, RunQueries, RunRepository};
use crate::ports::survey_mirror::SurveyMirror;
use crate::ports::survey_repository::SurveyRepository;
use async_trait::async_trait;
use selfcheck_domain::{Id, OwnerScope, ResponseState, SurveyBlueprint};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemRuns {
    buckets: Mutex<HashMap<String, BTreeMap<Id, ResponseState>>>,
    pub saves: AtomicUsize,
    pub fail_saves: AtomicBool,
}

impl MemRuns {
    pub fn count(&self, scope: &OwnerScope) -> usize {
        self.buckets
            .lock()
            .unwrap()
            .get(scope.bucket_key())
            .map(|b| b.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RunRepository for MemRuns {
    async fn get_run(
        &self,
        scope: &OwnerScope,
        run_id: &str,
    ) -> Result<Option<ResponseState>, RepositoryError> {
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .get(scope.bucket_key())
            .and_then(|b| b.get(run_id).cloned()))
    }

    async fn save_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Io("disk full".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.buckets
            .lock()
            .unwrap()
            .entry(scope.bucket_key().to_string())
            .or_default()
            .insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError> {
        if let Some(bucket) = self.buckets.lock().unwrap().get_mut(scope.bucket_key()) {
            bucket.remove(run_id);
        }
        Ok(())
    }

    async fn clear_all(&self, scope: &OwnerScope) -> Result<(), RepositoryError> {
        self.buckets.lock().unwrap().remove(scope.bucket_key());
        Ok(())
    }
}

#[async_trait]
impl RunQueries for MemRuns {
    async fn list_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError> {
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .get(scope.bucket_key())
            .map(|b| b.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemSurveys {
    surveys: Mutex<BTreeMap<Id, SurveyBlueprint>>,
}

impl MemSurveys {
    pub fn with(surveys: impl IntoIterator<Item = SurveyBlueprint>) -> Self {
        let repo = Self::default();
        for survey in surveys {
            repo.surveys
                .lock()
                .unwrap()
                .insert(survey.survey_id.clone(), survey);
        }
        repo
    }
}

#[async_trait]
impl SurveyRepository for MemSurveys {
    async fn get(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
        Ok(self.surveys.lock().unwrap().get(survey_id).cloned())
    }

    async fn list(&self) -> Result<Vec<SurveyBlueprint>, RepositoryError> {
        Ok(self.surveys.lock().unwrap().values().cloned().collect())
    }

    async fn save_unchecked(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
        self.surveys
            .lock()
            .unwrap()
            .insert(survey.survey_id.clone(), survey.clone());
        Ok(())
    }

    async fn remove(&self, survey_id: &str) -> Result<(), RepositoryError> {
        self.surveys.lock().unwrap().remove(survey_id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        self.surveys.lock().unwrap().clear();
        Ok(())
    }
}

/// Mirror that can be switched offline.
#[derive(Default)]
pub struct FlakyMirror {
    pub offline: AtomicBool,
    pub runs: Mutex<BTreeMap<(String, Id), ResponseState>>,
    pub surveys: Mutex<BTreeMap<Id, SurveyBlueprint>>,
}

impl FlakyMirror {
    pub fn offline() -> Self {
        let mirror = Self::default();
        mirror.offline.store(true, Ordering::SeqCst);
        mirror
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn holds(&self, scope: &OwnerScope, run_id: &str) -> Option<ResponseState> {
        self.runs
            .lock()
            .unwrap()
            .get(&(scope.bucket_key().to_string(), run_id.to_string()))
            .cloned()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Backend("mirror unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RunMirror for FlakyMirror {
    async fn push_run(&self, scope: &OwnerScope, run: &ResponseState) -> Result<(), RepositoryError> {
        self.check()?;
        self.runs.lock().unwrap().insert(
            (scope.bucket_key().to_string(), run.run_id.clone()),
            run.clone(),
        );
        Ok(())
    }

    async fn remove_run(&self, scope: &OwnerScope, run_id: &str) -> Result<(), RepositoryError> {
        self.check()?;
        self.runs
            .lock()
            .unwrap()
            .remove(&(scope.bucket_key().to_string(), run_id.to_string()));
        Ok(())
    }

    async fn pull_runs(&self, scope: &OwnerScope) -> Result<Vec<ResponseState>, RepositoryError> {
        self.check()?;
        let mut runs: Vec<_> = self
            .runs
            .lock()
            .unwrap()
            .iter()
            .filter(|((bucket, _), _)| bucket == scope.bucket_key())
            .map(|(_, run)| run.clone())
            .collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }
}

#[derive(Default)]
pub struct RecordingLog {
    pub events: Mutex<Vec<&'static str>>,
}

impl RecordingLog {
    pub fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl ActivityLogger for RecordingLog {
    fn log(&self, event: ActivityEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}

#[async_trait]
impl SurveyMirror for FlakyMirror {
    async fn push_survey(&self, survey: &SurveyBlueprint) -> Result<(), RepositoryError> {
        self.check()?;
        self.surveys
            .lock()
            .unwrap()
            .insert(survey.survey_id.clone(), survey.clone());
        Ok(())
    }

    async fn fetch_survey(&self, survey_id: &str) -> Result<Option<SurveyBlueprint>, RepositoryError> {
        self.check()?;
        Ok(self.surveys.lock().unwrap().get(survey_id).cloned())
    }
}
