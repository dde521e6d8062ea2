//! Run document (v1).

use super::{MapperError, SCHEMA_VERSION};
use selfcheck_domain::core::string::is_blank;
use selfcheck_domain::{Answers, FocusState, Id, ResponseState, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDocV1 {
    pub schema_version: u32,
    pub run_id: Id,
    pub survey_id: Id,
    pub started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusState>,
    pub updated_at: Timestamp,
}

pub fn to_run_doc(run: &ResponseState, now: Timestamp) -> RunDocV1 {
    RunDocV1 {
        schema_version: SCHEMA_VERSION,
        run_id: run.run_id.clone(),
        survey_id: run.survey_id.clone(),
        started_at: run.started_at,
        completed_at: run.completed_at,
        answers: run.answers.clone(),
        focus: run.focus.clone(),
        updated_at: now,
    }
}

pub fn from_run_doc(doc: RunDocV1) -> Result<ResponseState, MapperError> {
    if doc.schema_version != SCHEMA_VERSION {
        return Err(MapperError::UnsupportedSchema {
            kind: "RunDoc",
            found: doc.schema_version,
        });
    }
    if is_blank(&doc.run_id) {
        return Err(MapperError::MissingField {
            kind: "RunDoc",
            field: "runId",
        });
    }

    Ok(ResponseState {
        run_id: doc.run_id,
        survey_id: doc.survey_id,
        started_at: doc.started_at,
        completed_at: doc.completed_at,
        answers: doc.answers,
        focus: doc.focus,
    })
}
