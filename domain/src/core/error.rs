//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Blueprint validation problems are *not* errors: they are returned as
/// [`ValidationIssue`](crate::survey::validation::ValidationIssue) data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Run is not complete: {0}")]
    RunNotComplete(String),

    #[error("{allocated} points allocated, budget is {budget}")]
    OverBudget { allocated: u32, budget: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reference_display() {
        assert_eq!(
            DomainError::UnknownPrompt("p9".to_string()).to_string(),
            "Unknown prompt: p9"
        );
        assert_eq!(
            DomainError::RunNotComplete("r_1".to_string()).to_string(),
            "Run is not complete: r_1"
        );
    }

    #[test]
    fn test_over_budget_display() {
        let error = DomainError::OverBudget {
            allocated: 12,
            budget: 10,
        };
        assert_eq!(error.to_string(), "12 points allocated, budget is 10");
    }
}
