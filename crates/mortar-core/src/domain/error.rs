// ============================================================================
// domain/error.rs - ENTITY MODEL ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Every variant describes a malformed entity model. They are raised before
/// any file is touched and abort the whole run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Model shape
    // ========================================================================
    #[error("application module path is empty")]
    EmptyModule,

    #[error("invalid module path '{module}': {reason}")]
    InvalidModule { module: String, reason: String },

    #[error("invalid {what} name '{name}': {reason}")]
    InvalidIdentifier {
        what: &'static str,
        name: String,
        reason: String,
    },

    #[error("entity '{entity}' has no fields")]
    NoFields { entity: String },

    // ========================================================================
    // Fields
    // ========================================================================
    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("invalid field type '{input}': {reason}")]
    InvalidFieldType { input: String, reason: String },

    #[error("field '{field}' on entity '{entity}' is reserved")]
    ReservedField { entity: String, field: String },

    // ========================================================================
    // Uniqueness
    // ========================================================================
    #[error("entity '{name}' is declared more than once")]
    DuplicateEntity { name: String },

    #[error("field '{field}' is declared more than once on entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    // ========================================================================
    // References
    // ========================================================================
    #[error("field '{field}' on entity '{entity}' references unknown entity '{target}'")]
    UnknownReference {
        entity: String,
        field: String,
        target: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyModule | Self::InvalidModule { .. } => vec![
                "Set [application] module to your Go module path".into(),
                "Example: module = \"github.com/acme/shop\"".into(),
            ],
            Self::InvalidIdentifier { what, .. } => vec![
                format!("{what} names must be exported Go identifiers"),
                "Start with an uppercase ASCII letter; use letters, digits and '_' only".into(),
            ],
            Self::NoFields { entity } => vec![format!(
                "Add at least one field to '{entity}', e.g. \"Name:string(required)\""
            )],
            Self::InvalidField(_) | Self::InvalidFieldType { .. } => vec![
                "Fields use the form Name:type(flags), e.g. \"Email:string(required,email)\"".into(),
                "Types: string, int, float, bool, time, uuid, ref<Entity>, optional<T> / T?, list<T> / []T".into(),
                "Flags: required, identifier, email, url".into(),
            ],
            Self::ReservedField { .. } => vec![
                "Every record gets an 'ID' field automatically; remove it from the model".into(),
            ],
            Self::DuplicateEntity { name } => {
                vec![format!("Merge the two '{name}' entries into one")]
            }
            Self::DuplicateField { field, .. } => {
                vec![format!("Remove or rename one of the '{field}' fields")]
            }
            Self::UnknownReference { target, .. } => vec![
                format!("Declare an entity named '{target}'"),
                "Reference names are case-sensitive".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownReference { .. } => ErrorCategory::NotFound,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
}
