//! Driven (output) ports - implemented by infrastructure.
//!
//! The `mortar-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{Application, EntityConfig, RelativePath};
use crate::error::MortarResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `mortar_adapters::filesystem::LocalFilesystem` (production)
/// - `mortar_adapters::filesystem::MemoryFilesystem` (testing, dry runs)
///
/// Paths handed to the port are already resolved against the output root.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a file. `Ok(None)` when it does not exist.
    fn read_to_string(&self, path: &Path) -> MortarResult<Option<String>>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &str) -> MortarResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> MortarResult<()>;

    /// Copy a file, replacing the destination.
    fn copy(&self, from: &Path, to: &Path) -> MortarResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for whole-file artifacts (protobuf definitions, SQL schemas).
///
/// Artifacts are rendered from the entity model alone and written only when
/// their content changes; there is no merge step.
pub trait ArtifactRenderer: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Whether this entity gets the artifact at all.
    fn applies_to(&self, entity: &EntityConfig) -> bool;

    /// Where the artifact lives, relative to the output root.
    fn path(&self, entity: &EntityConfig) -> RelativePath;

    /// Full file content.
    fn render(&self, app: &Application, entity: &EntityConfig) -> MortarResult<String>;
}
