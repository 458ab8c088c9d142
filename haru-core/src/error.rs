//! Error types for the haru compiler.

use thiserror::Error;

/// Errors that can occur while compiling text into a schedule.
///
/// Every variant is scoped to a single call; none of them is fatal to the
/// caller, which decides whether to re-prompt the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HaruError {
    #[error("Ambiguous date in '{text}': {reason}")]
    AmbiguousDate { text: String, reason: String },

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("No exam date given and none remembered")]
    MissingExamDate,
}

impl HaruError {
    pub(crate) fn ambiguous(text: &str, reason: impl Into<String>) -> Self {
        HaruError::AmbiguousDate {
            text: text.trim().to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller should ask the user for a clarification hint.
    pub fn needs_clarification(&self) -> bool {
        matches!(
            self,
            HaruError::AmbiguousDate { .. } | HaruError::MissingExamDate
        )
    }
}

/// Result type alias for haru operations.
pub type HaruResult<T> = Result<T, HaruError>;
