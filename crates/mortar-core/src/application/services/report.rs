//! Summary of one generation run.

use std::path::PathBuf;

use serde::Serialize;

use crate::application::components::Layer;
use crate::application::pipeline::{FileChange, FileStatus};

/// One merged source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub entity: String,
    pub component: &'static str,
    pub layer: Layer,
    #[serde(flatten)]
    pub change: FileChange,
}

/// One whole-file artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub entity: String,
    pub artifact: &'static str,
    pub path: PathBuf,
    pub written: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub root: PathBuf,
    pub dry_run: bool,
    pub entities: usize,
    pub files: Vec<FileReport>,
    pub artifacts: Vec<ArtifactReport>,
}

impl RunReport {
    pub fn new(root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            dry_run,
            ..Self::default()
        }
    }

    /// Source files and artifacts whose content changed.
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| f.change.status.is_written()).count()
            + self.artifacts.iter().filter(|a| a.written).count()
    }

    pub fn unchanged(&self) -> usize {
        self.files.len() + self.artifacts.len() - self.written()
    }

    pub fn count(&self, status: FileStatus) -> usize {
        self.files
            .iter()
            .filter(|f| f.change.status == status)
            .count()
    }
}
