//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! Every storage call takes the [`OwnerScope`](selfcheck_domain::OwnerScope)
//! explicitly.

pub mod activity_log;
pub mod clock;
pub mod run_mirror;
pub mod run_repository;
pub mod survey_mirror;
pub mod survey_repository;
