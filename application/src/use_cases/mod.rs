//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod edit_survey;
pub mod save_survey;
pub mod sync_runs;
pub mod take_survey;
pub mod view_results;

#[cfg(test)]
pub(crate) mod testing;
