//! Survey document (v1).

use super::{MapperError, SCHEMA_VERSION};
use selfcheck_domain::core::string::is_blank;
use selfcheck_domain::survey::entities::serialize_version;
use selfcheck_domain::{Category, Id, Prompt, Scale, SurveyBlueprint, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDocV1 {
    pub schema_version: u32,
    /// Also the document name.
    #[serde(default)]
    pub survey_id: Id,
    #[serde(serialize_with = "serialize_version")]
    pub version: f64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scale: Scale,
    pub categories: Vec<Category>,
    pub prompts: Vec<Prompt>,
    pub updated_at: Timestamp,
}

pub fn survey_to_doc(survey: &SurveyBlueprint, now: Timestamp) -> SurveyDocV1 {
    SurveyDocV1 {
        schema_version: SCHEMA_VERSION,
        survey_id: survey.survey_id.clone(),
        version: survey.version,
        title: survey.title.clone(),
        description: survey.description.clone(),
        scale: survey.scale,
        categories: survey.categories.clone(),
        prompts: survey.prompts.clone(),
        updated_at: now,
    }
}

/// Strict read: wrong schema version or a missing `surveyId` is an error.
/// Content is not validated here.
pub fn doc_to_survey(doc: SurveyDocV1) -> Result<SurveyBlueprint, MapperError> {
    if doc.schema_version != SCHEMA_VERSION {
        return Err(MapperError::UnsupportedSchema {
            kind: "SurveyDoc",
            found: doc.schema_version,
        });
    }
    if is_blank(&doc.survey_id) {
        return Err(MapperError::MissingField {
            kind: "SurveyDoc",
            field: "surveyId",
        });
    }

    Ok(SurveyBlueprint {
        survey_id: doc.survey_id,
        version: doc.version,
        title: doc.title,
        description: doc.description,
        scale: doc.scale,
        categories: doc.categories,
        prompts: doc.prompts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfcheck_domain::default_survey;

    #[test]
    fn test_doc_round_trip() {
        let survey = default_survey();
        let doc = survey_to_doc(&survey, 1_234);

        assert_eq!(doc.schema_version, 1);
        assert_eq!(doc.updated_at, 1_234);
        assert_eq!(doc_to_survey(doc).unwrap(), survey);
    }

    #[test]
    fn test_missing_survey_id_is_rejected() {
        let json = serde_json::json!({
            "schemaVersion": 1,
            "version": 1,
            "title": "No id",
            "scale": {"min": 1, "max": 5, "step": 1},
            "categories": [],
            "prompts": [],
            "updatedAt": 0
        });
        let doc: SurveyDocV1 = serde_json::from_value(json).unwrap();

        assert_eq!(
            doc_to_survey(doc).unwrap_err(),
            MapperError::MissingField {
                kind: "SurveyDoc",
                field: "surveyId"
            }
        );
    }

    #[test]
    fn test_unknown_schema_version_is_rejected() {
        let mut doc = survey_to_doc(&default_survey(), 0);
        doc.schema_version = 0;
        assert!(matches!(
            doc_to_survey(doc),
            Err(MapperError::UnsupportedSchema { found: 0, .. })
        ));
    }
}
