//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`SurveyBehavior`]: focus selection limits and blueprint seeding

pub mod survey_behavior;

pub use survey_behavior::SurveyBehavior;
