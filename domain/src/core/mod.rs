//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: identifiers, timestamps and the [`OwnerScope`](ids::OwnerScope) storage scope
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: display helpers

pub mod error;
pub mod ids;
pub mod string;
