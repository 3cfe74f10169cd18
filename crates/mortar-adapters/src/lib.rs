//! Infrastructure adapters for Mortar.
//!
//! This crate implements the ports defined in `mortar_core::application::ports`:
//! filesystems (local and in-memory) and the whole-file artifact renderers.

pub mod filesystem;
pub mod renderer;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::{ProtoSchemaRenderer, SqlSchemaRenderer, TemplateContext};
