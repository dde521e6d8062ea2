//! Survey blueprints.
//!
//! - [`entities::SurveyBlueprint`]: the authored template (scale, categories, prompts)
//! - [`validation::validate_survey`]: structural invariants, returned as issue data
//! - [`summary::compute_summary`]: per-category and overall averages for a set of answers
//! - [`seed::default_survey`]: built-in blueprint for demos and first start

pub mod entities;
pub mod seed;
pub mod summary;
pub mod validation;
