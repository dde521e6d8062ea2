//! Application layer for selfcheck
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SurveyBehavior;
pub use ports::{
    activity_log::{ActivityEvent, ActivityLogger, NoActivityLog},
    clock::{Clock, FixedClock, SystemClock},
    run_mirror::{NoMirror, RunMirror},
    run_repository::{RepositoryError, RunQueries, RunRepository, RunStore},
    survey_mirror::SurveyMirror,
    survey_repository::{SaveOutcome, SurveyRepository},
};
pub use use_cases::edit_survey::SurveyEditor;
pub use use_cases::save_survey::{SaveSurveyError, SaveSurveyUseCase};
pub use use_cases::sync_runs::{PendingSync, SyncError, SyncQueue, SyncReport, SyncRunsUseCase};
pub use use_cases::take_survey::{RunError, RunSession, TakeSurveyUseCase};
pub use use_cases::view_results::{ResultsError, RunOverview, RunResults, ViewResultsUseCase};
