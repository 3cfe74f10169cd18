// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Mortar.
//!
//! Pure logic, no I/O:
//!
//! - **Entity model**: what to generate (`model`, `value_objects`, `validation`)
//! - **Source tree**: lossless structural view of one Go file (`source`)
//! - **Locator / merge**: find declarations by identity key and append what is
//!   missing (`locate`, `merge`)
//!
//! Filesystem access and orchestration live in the application layer.

pub mod common;
pub mod error;
pub mod locate;
pub mod merge;
pub mod model;
pub mod naming;
pub mod source;
pub mod value_objects;

mod validation;

pub use common::RelativePath;
pub use error::{DomainError, ErrorCategory};
pub use locate::{Located, find, locate};
pub use merge::{Conflict, MergeAction, ensure, fill_members};
pub use model::{Application, Capabilities, Constraints, EntityConfig, EntityModel, Field};
pub use source::{
    Aggregate, DeclKind, Declaration, IdentityKey, Member, MemberStyle, MethodBody, ParseError,
    SourceFile, TypeShape, parse,
};
pub use validation::ModelValidator;
pub use value_objects::{Backend, FieldType, Format, Transport};
