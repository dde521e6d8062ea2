//! Local persistence adapters.
//!
//! - [`JsonFileStore`]: directory of JSON documents
//! - [`LocalRunRepository`] / [`LocalSurveyRepository`]: bucket files per owner
//! - [`InMemoryRunRepository`] / [`InMemorySurveyRepository`]: ephemeral

mod json_store;
mod local_runs;
mod local_surveys;
mod memory;

pub use json_store::{JsonFileStore, file_safe};
pub use local_runs::{LocalRunRepository, runs_file_name};
pub use local_surveys::{LocalSurveyRepository, SURVEYS_FILE_NAME};
pub use memory::{InMemoryRunRepository, InMemorySurveyRepository};
