//! Survey blueprint entities

use crate::core::ids::Id;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of values [`Scale::values`] enumerates.
pub const MAX_SCALE_VALUES: usize = 1_000;

/// Numeric answer range shared by every prompt of a blueprint.
///
/// A scale missing from a stored document deserializes to NaN bounds so
/// that validation reports it instead of the parser rejecting the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scale {
    #[serde(deserialize_with = "nan_if_null")]
    pub min: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub max: f64,
    #[serde(deserialize_with = "nan_if_null")]
    pub step: f64,
}

// serde_json writes NaN as `null`; read it back as NaN.
pub fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

// An explicit `null` string or list reads as empty.
fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Write a whole version as a JSON integer, anything else as a float.
pub fn serialize_version<S>(version: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if is_whole_version(*version) {
        serializer.serialize_i64(*version as i64)
    } else {
        serializer.serialize_f64(*version)
    }
}

/// True for a finite integral version that fits an `i64`.
pub fn is_whole_version(version: f64) -> bool {
    version.is_finite() && version.fract() == 0.0 && version.abs() < i64::MAX as f64
}

impl Scale {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// True if `value` lies within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Every selectable value from `min` to `max` in `step` increments.
    ///
    /// Empty for an invalid scale, and for one with more than
    /// [`MAX_SCALE_VALUES`] values.
    pub fn values(&self) -> Vec<f64> {
        if !self.min.is_finite() || !self.max.is_finite() || !(self.step > 0.0) {
            return Vec::new();
        }
        let steps = ((self.max - self.min) / self.step).floor();
        if !(0.0..MAX_SCALE_VALUES as f64).contains(&steps) {
            return Vec::new();
        }
        (0..=steps as usize)
            .map(|i| self.min + self.step * i as f64)
            .collect()
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            step: f64::NAN,
        }
    }
}

/// A grouping of prompts for aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    #[serde(deserialize_with = "default_if_null")]
    pub category_id: Id,
    #[serde(deserialize_with = "default_if_null")]
    pub label: String,
}

impl Category {
    pub fn new(category_id: impl Into<Id>, label: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            label: label.into(),
        }
    }
}

/// A single statement answered on the blueprint's scale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prompt {
    #[serde(deserialize_with = "default_if_null")]
    pub prompt_id: Id,
    #[serde(deserialize_with = "default_if_null")]
    pub category_id: Id,
    #[serde(deserialize_with = "default_if_null")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl Prompt {
    pub fn new(
        prompt_id: impl Into<Id>,
        category_id: impl Into<Id>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            category_id: category_id.into(),
            text: text.into(),
            help_text: None,
        }
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }
}

/// A survey template (Entity).
///
/// Blueprints are treated as immutable values: edits produce a new value
/// which is re-validated before it may be saved.
///
/// Every field defaults when absent or `null` so that malformed stored
/// documents surface as validation issues rather than parse failures. The
/// version is read as any JSON number for the same reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyBlueprint {
    #[serde(deserialize_with = "default_if_null")]
    pub survey_id: Id,
    #[serde(deserialize_with = "nan_if_null", serialize_with = "serialize_version")]
    pub version: f64,
    #[serde(deserialize_with = "default_if_null")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scale: Scale,
    #[serde(deserialize_with = "default_if_null")]
    pub categories: Vec<Category>,
    #[serde(deserialize_with = "default_if_null")]
    pub prompts: Vec<Prompt>,
}

impl SurveyBlueprint {
    /// Start a version-1 blueprint with no categories or prompts.
    pub fn new(survey_id: impl Into<Id>, title: impl Into<String>, scale: Scale) -> Self {
        Self {
            survey_id: survey_id.into(),
            version: 1.0,
            title: title.into(),
            description: None,
            scale,
            categories: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: f64) -> Self {
        self.version = version;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_prompt(mut self, prompt: Prompt) -> Self {
        self.prompts.push(prompt);
        self
    }

    /// Look up a category by id.
    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.category_id == category_id)
    }

    /// Look up a prompt by id.
    pub fn prompt(&self, prompt_id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.prompt_id == prompt_id)
    }

    /// Position of a prompt in declared order.
    pub fn prompt_index(&self, prompt_id: &str) -> Option<usize> {
        self.prompts.iter().position(|p| p.prompt_id == prompt_id)
    }

    /// Prompt ids in declared order.
    pub fn prompt_ids(&self) -> impl Iterator<Item = &str> {
        self.prompts.iter().map(|p| p.prompt_id.as_str())
    }

    /// Prompts belonging to one category, in declared order.
    pub fn prompts_in(&self, category_id: &str) -> impl Iterator<Item = &Prompt> {
        self.prompts
            .iter()
            .filter(move |p| p.category_id == category_id)
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.len()
    }
}
