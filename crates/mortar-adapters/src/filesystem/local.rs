//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use mortar_core::application::{ApplicationError, ports::Filesystem};
use mortar_core::error::{MortarError, MortarResult};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> MortarResult<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(path, e, "read file")),
        }
    }

    fn write_file(&self, path: &Path, content: &str) -> MortarResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn create_dir_all(&self, path: &Path) -> MortarResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn copy(&self, from: &Path, to: &Path) -> MortarResult<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| map_io_error(to, e, "copy file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> MortarError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        assert_eq!(fs.read_to_string(&dir.path().join("nope.go")).unwrap(), None);
    }

    #[test]
    fn write_then_read_and_copy() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("internal/domain");
        fs.create_dir_all(&nested).unwrap();

        let file = nested.join("widget.go");
        fs.write_file(&file, "package domain\n").unwrap();
        assert!(fs.exists(&file));
        assert_eq!(
            fs.read_to_string(&file).unwrap().as_deref(),
            Some("package domain\n")
        );

        let backup = nested.join("widget.go.bak");
        fs.copy(&file, &backup).unwrap();
        assert_eq!(
            std::fs::read_to_string(&backup).unwrap(),
            "package domain\n"
        );
    }

    #[test]
    fn reading_a_directory_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFilesystem::new().read_to_string(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            MortarError::Application(ApplicationError::FilesystemError { .. })
        ));
    }

    #[test]
    fn writing_into_a_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFilesystem::new()
            .write_file(&dir.path().join("missing/widget.go"), "x")
            .unwrap_err();
        assert!(err.to_string().contains("Failed to write file"));
    }
}
