//! Unified error handling for Mortar Core.
//!
//! Wraps domain and application errors behind one type with user-actionable
//! suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Mortar Core operations.
#[derive(Debug, Error, Clone)]
pub enum MortarError {
    /// The entity model is malformed.
    #[error("Invalid model: {0}")]
    Domain(#[from] DomainError),

    /// Generation failed.
    #[error("{0}")]
    Application(#[from] ApplicationError),
}

impl MortarError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
        }
    }

    /// Whether this error only affects one file.
    pub fn is_file_scoped(&self) -> bool {
        matches!(self, Self::Application(e) if e.is_file_scoped())
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

/// Convenient result type alias.
pub type MortarResult<T> = Result<T, MortarError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn merge_conflicts_are_file_scoped() {
        let err: MortarError = ApplicationError::MergeConflict {
            path: PathBuf::from("internal/domain/widget.go"),
            key: "type Widget".into(),
            existing: "func".into(),
            desired: "struct".into(),
        }
        .into();
        assert!(err.is_file_scoped());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn model_errors_are_validation() {
        let err: MortarError = DomainError::EmptyModule.into();
        assert!(!err.is_file_scoped());
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().starts_with("Invalid model:"));
    }
}
