//! Versioned document shapes for the mirror store.
//!
//! The mirror keeps runs at `users/<owner>/runs/<runId>.json` and
//! blueprints at `surveys/<surveyId>.json`. Every document carries
//! `schemaVersion` and `updatedAt`; readers reject versions they do not
//! know.

mod mirror;
mod run_doc;
mod survey_doc;

pub use mirror::DocumentStoreMirror;
pub use run_doc::{RunDocV1, from_run_doc, to_run_doc};
pub use survey_doc::{SurveyDocV1, doc_to_survey, survey_to_doc};

use thiserror::Error;

/// The only schema version written and accepted.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    #[error("Unsupported {kind} schemaVersion: {found}")]
    UnsupportedSchema { kind: &'static str, found: u32 },

    #[error("{kind} document is missing {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}
