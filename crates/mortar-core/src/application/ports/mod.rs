//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `mortar-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: reading, writing and copying generated files
//!   - `ArtifactRenderer`: whole-file artifacts with no merge step
//!
//! - **Driving (Input) Ports**: `Orchestrator::run`, called by the CLI

pub mod output;

pub use output::{ArtifactRenderer, Filesystem};

#[cfg(test)]
pub use output::MockFilesystem;
