//! Application layer for Mortar.
//!
//! This layer contains:
//! - **Loader / arena / pipeline**: one load → merge → render cycle per file
//! - **Components**: what each layer's file should contain
//! - **Services**: the orchestrator that runs a whole model
//! - **Ports**: traits implemented by `mortar-adapters`
//! - **Errors**: application-specific error types
//!
//! Merge rules live in `crate::domain`; this layer only sequences them and
//! talks to the ports.

pub mod arena;
pub mod components;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod ports;
pub mod services;

pub use arena::FileArena;
pub use components::{GeneratorComponent, Layer, TargetFile};
pub use error::{ApplicationError, FileFailure};
pub use loader::{FallbackPolicy, LoadOutcome, SourceLoader, SynthesisCause};
pub use pipeline::{FileChange, FileStatus};
pub use ports::{ArtifactRenderer, Filesystem};
pub use services::{ArtifactReport, FileReport, GenerateOptions, Orchestrator, RunReport};
