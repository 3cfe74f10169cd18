//! Application services - orchestrate use cases.
//!
//! The orchestrator drives the load/merge/render pipeline across every
//! entity and component and reports what it did.

pub mod orchestrator;
pub mod report;

pub use orchestrator::{GenerateOptions, Orchestrator};
pub use report::{ArtifactReport, FileReport, RunReport};
