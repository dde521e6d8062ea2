//! Structural validation of survey blueprints.
//!
//! [`validate_survey`] never fails and never short-circuits: every check
//! runs and every problem is collected, so an editor can show all of them
//! at once. A blueprint with any issue must not be saved.
//!
//! # Examples
//!
//! ```
//! use selfcheck_domain::survey::entities::{Category, Prompt, Scale, SurveyBlueprint};
//! use selfcheck_domain::survey::validation::{validate_survey, IssueCode};
//!
//! let survey = SurveyBlueprint::new("s1", "Check-in", Scale::new(1.0, 7.0, 1.0))
//!     .with_category(Category::new("c1", "Energy"))
//!     .with_prompt(Prompt::new("p1", "c_missing", "How is your energy?"));
//!
//! let issues = validate_survey(&survey).into_issues();
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].code, IssueCode::MissingRef);
//! assert_eq!(issues[0].path, "prompts[0].categoryId");
//! ```

use super::entities::{Scale, SurveyBlueprint, is_whole_version};
use crate::core::string::is_blank;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifies the kind of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// A required string or list is empty.
    Empty,
    /// An id repeats an earlier id in the same list.
    DuplicateId,
    /// A reference points at an id that is not declared.
    MissingRef,
    /// A value lies outside the scale bounds.
    OutOfRange,
    /// The scale bounds or step are unusable.
    InvalidScale,
    /// A value has the wrong shape (non-integer version, non-finite answer).
    InvalidValue,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Empty => "EMPTY",
            IssueCode::DuplicateId => "DUPLICATE_ID",
            IssueCode::MissingRef => "MISSING_REF",
            IssueCode::OutOfRange => "OUT_OF_RANGE",
            IssueCode::InvalidScale => "INVALID_SCALE",
            IssueCode::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected problem, located by a dotted/indexed path
/// such as `prompts[2].categoryId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.code, self.message)
    }
}

/// Outcome of validating a blueprint.
///
/// Serializes as `{"ok": true}` or `{"ok": false, "issues": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Ok,
    /// Always holds at least one issue.
    Invalid { issues: Vec<ValidationIssue> },
}

impl Serialize for ValidationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        match self {
            ValidationResult::Ok => {
                let mut state = serializer.serialize_struct("ValidationResult", 1)?;
                state.serialize_field("ok", &true)?;
                state.end()
            }
            ValidationResult::Invalid { issues } => {
                let mut state = serializer.serialize_struct("ValidationResult", 2)?;
                state.serialize_field("ok", &false)?;
                state.serialize_field("issues", issues)?;
                state.end()
            }
        }
    }
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        if issues.is_empty() {
            ValidationResult::Ok
        } else {
            ValidationResult::Invalid { issues }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    /// Issues found (empty when valid).
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationResult::Ok => &[],
            ValidationResult::Invalid { issues } => issues,
        }
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        match self {
            ValidationResult::Ok => Vec::new(),
            ValidationResult::Invalid { issues } => issues,
        }
    }
}

/// Check every structural invariant of a blueprint.
pub fn validate_survey(survey: &SurveyBlueprint) -> ValidationResult {
    let mut issues = Vec::new();

    if is_blank(&survey.survey_id) {
        issues.push(ValidationIssue::new(
            "surveyId",
            IssueCode::Empty,
            "surveyId is required.",
        ));
    }
    if is_blank(&survey.title) {
        issues.push(ValidationIssue::new(
            "title",
            IssueCode::Empty,
            "title is required.",
        ));
    }
    if !is_whole_version(survey.version) || survey.version < 1.0 {
        issues.push(ValidationIssue::new(
            "version",
            IssueCode::InvalidValue,
            "version must be an integer >= 1.",
        ));
    }

    if !is_valid_scale(&survey.scale) {
        issues.push(ValidationIssue::new(
            "scale",
            IssueCode::InvalidScale,
            "scale must have finite min/max and step > 0 and min < max.",
        ));
    }

    let mut category_ids: HashSet<&str> = HashSet::new();
    for (i, category) in survey.categories.iter().enumerate() {
        let base = format!("categories[{}]", i);
        if is_blank(&category.category_id) {
            issues.push(ValidationIssue::new(
                format!("{}.categoryId", base),
                IssueCode::Empty,
                "categoryId is required.",
            ));
        }
        if is_blank(&category.label) {
            issues.push(ValidationIssue::new(
                format!("{}.label", base),
                IssueCode::Empty,
                "label is required.",
            ));
        }
        if !is_blank(&category.category_id) && !category_ids.insert(&category.category_id) {
            issues.push(ValidationIssue::new(
                format!("{}.categoryId", base),
                IssueCode::DuplicateId,
                "Duplicate categoryId.",
            ));
        }
    }

    if survey.categories.is_empty() {
        issues.push(ValidationIssue::new(
            "categories",
            IssueCode::Empty,
            "At least one category is required.",
        ));
    }

    let mut prompt_ids: HashSet<&str> = HashSet::new();
    for (i, prompt) in survey.prompts.iter().enumerate() {
        let base = format!("prompts[{}]", i);
        if is_blank(&prompt.prompt_id) {
            issues.push(ValidationIssue::new(
                format!("{}.promptId", base),
                IssueCode::Empty,
                "promptId is required.",
            ));
        }
        if is_blank(&prompt.text) {
            issues.push(ValidationIssue::new(
                format!("{}.text", base),
                IssueCode::Empty,
                "text is required.",
            ));
        }
        if is_blank(&prompt.category_id) {
            issues.push(ValidationIssue::new(
                format!("{}.categoryId", base),
                IssueCode::Empty,
                "categoryId is required.",
            ));
        }
        if !is_blank(&prompt.prompt_id) && !prompt_ids.insert(&prompt.prompt_id) {
            issues.push(ValidationIssue::new(
                format!("{}.promptId", base),
                IssueCode::DuplicateId,
                "Duplicate promptId.",
            ));
        }
        if !is_blank(&prompt.category_id) && !category_ids.contains(prompt.category_id.as_str()) {
            issues.push(ValidationIssue::new(
                format!("{}.categoryId", base),
                IssueCode::MissingRef,
                "prompt.categoryId must reference an existing categoryId.",
            ));
        }
    }

    if survey.prompts.is_empty() {
        issues.push(ValidationIssue::new(
            "prompts",
            IssueCode::Empty,
            "At least one prompt is required.",
        ));
    }

    ValidationResult::from_issues(issues)
}

fn is_valid_scale(scale: &Scale) -> bool {
    scale.min.is_finite()
        && scale.max.is_finite()
        && scale.step.is_finite()
        && scale.step > 0.0
        && scale.min < scale.max
}

/// Check a single answer value against the blueprint scale at input time.
///
/// Returns `None` when the value may be recorded.
pub fn validate_answer(scale: &Scale, value: f64) -> Option<ValidationIssue> {
    if !value.is_finite() {
        return Some(ValidationIssue::new(
            "value",
            IssueCode::InvalidValue,
            "answer must be a finite number.",
        ));
    }
    if !scale.contains(value) {
        return Some(ValidationIssue::new(
            "value",
            IssueCode::OutOfRange,
            format!("answer must be between {} and {}.", scale.min, scale.max),
        ));
    }
    None
}
