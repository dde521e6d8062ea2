//! Domain layer for selfcheck
//!
//! This crate contains the survey entities, the blueprint validator, the
//! summary aggregator and the run lifecycle rules. It has no dependencies
//! on storage or presentation concerns; everything here is pure and
//! synchronous.
//!
//! # Core Concepts
//!
//! ## Blueprint
//!
//! A [`SurveyBlueprint`] is an authored template: a numeric [`Scale`],
//! ordered [`Category`] groups and ordered [`Prompt`]s. It must pass
//! [`validate_survey`] before it may be persisted.
//!
//! ## Run
//!
//! A [`ResponseState`] is one owner's attempt at a blueprint. Answers are
//! recorded per prompt; once every prompt is answered the run is complete
//! and `completedAt` is stamped exactly once.
//!
//! ## Summary
//!
//! [`compute_summary`] derives per-category and overall averages from a
//! blueprint and a run's answers.

pub mod config;
pub mod core;
pub mod run;
pub mod survey;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    ids::{Id, OwnerScope, Timestamp, new_run_id},
};
pub use run::{
    cursor::{ForwardAction, RunCursor},
    entities::{Answers, ResponseState, is_answer},
    focus::{DEFAULT_BUDGET, DEFAULT_RANK_LIMIT, FocusMode, FocusState},
    lifecycle::RunStatus,
};
pub use survey::{
    entities::{Category, Prompt, Scale, SurveyBlueprint},
    seed::{DEFAULT_SURVEY_ID, default_survey},
    summary::{CategoryStat, ResultSummary, compute_summary},
    validation::{IssueCode, ValidationIssue, ValidationResult, validate_answer, validate_survey},
};
