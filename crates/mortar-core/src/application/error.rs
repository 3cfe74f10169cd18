//! Application layer errors.
//!
//! These errors represent failures while generating files, not a malformed
//! model. Model errors are `DomainError` from `crate::domain`.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorCategory;

/// One file that could not be generated, recorded while siblings continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub entity: String,
    pub component: String,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} for {}): {}",
            self.path.display(),
            self.component,
            self.entity,
            self.message
        )
    }
}

fn list_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  - {failure}"))
        .collect()
}

/// Errors that occur during generation.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A desired declaration collides with an existing one of another kind.
    #[error("Merge conflict in {path}: {key} exists as a {existing} but a {desired} is required")]
    MergeConflict {
        path: PathBuf,
        key: String,
        existing: String,
        desired: String,
    },

    /// One or more files were left untouched because of file-scoped errors.
    #[error("{} file(s) could not be generated:{}", .failures.len(), list_failures(.failures))]
    UnresolvedConflicts { failures: Vec<FileFailure> },

    /// An existing file failed to parse and the fallback policy is `abort`.
    #[error("Cannot parse {path}: {reason}")]
    UnparsableSource { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A whole-file artifact could not be rendered.
    #[error("Rendering {artifact} failed: {reason}")]
    RenderingFailed { artifact: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MergeConflict { path, key, .. } => vec![
                format!("Rename or remove the hand-written {key} in {}", path.display()),
                "Mortar never overwrites existing declarations".into(),
            ],
            Self::UnresolvedConflicts { .. } => vec![
                "Fix the listed files and run generate again".into(),
                "Files that were generated successfully are kept".into(),
            ],
            Self::UnparsableSource { path, .. } => vec![
                format!("Fix the syntax error in {}", path.display()),
                "Or rerun with --on-parse-failure backup to regenerate it (keeps a .bak copy)".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the output root is on a writable filesystem".into(),
            ],
            Self::RenderingFailed { .. } => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MergeConflict { .. } | Self::UnresolvedConflicts { .. } => {
                ErrorCategory::Conflict
            }
            Self::UnparsableSource { .. } => ErrorCategory::Validation,
            Self::FilesystemError { .. } | Self::RenderingFailed { .. } => ErrorCategory::Internal,
        }
    }

    /// Errors that stop one file but let the run continue with the rest.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            Self::MergeConflict { .. } | Self::UnparsableSource { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_conflicts_lists_every_file() {
        let err = ApplicationError::UnresolvedConflicts {
            failures: vec![
                FileFailure {
                    entity: "Widget".into(),
                    component: "record".into(),
                    path: "internal/domain/widget.go".into(),
                    message: "boom".into(),
                },
                FileFailure {
                    entity: "Gadget".into(),
                    component: "service".into(),
                    path: "internal/service/gadget.go".into(),
                    message: "bang".into(),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("2 file(s)"));
        assert!(text.contains("internal/domain/widget.go (record for Widget): boom"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn file_scoped_errors() {
        let conflict = ApplicationError::MergeConflict {
            path: "a.go".into(),
            key: "type Widget".into(),
            existing: "func".into(),
            desired: "struct".into(),
        };
        assert!(conflict.is_file_scoped());
        let fs = ApplicationError::FilesystemError {
            path: "a.go".into(),
            reason: "denied".into(),
        };
        assert!(!fs.is_file_scoped());
    }
}
