//! One load/merge/render cycle for one file.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::ApplicationError;
use crate::application::arena::FileArena;
use crate::application::components::TargetFile;
use crate::application::loader::{FallbackPolicy, LoadOutcome, SourceLoader, SynthesisCause};
use crate::domain::source::visit::Stats;
use crate::domain::{Declaration, MergeAction, ensure};
use crate::error::MortarResult;

/// What happened to a file during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Created,
    Updated,
    Unchanged,
    /// Unparsable on disk, regenerated from a skeleton.
    Regenerated,
}

impl FileStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Regenerated => "regenerated",
        }
    }

    pub fn is_written(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub status: FileStatus,
    pub actions: Vec<MergeAction>,
}

/// Merge `desired` into the file at `target` and stage the result.
///
/// # Errors
///
/// - `ApplicationError::MergeConflict` on the first conflicting declaration;
///   nothing is staged for the file.
/// - `ApplicationError::UnparsableSource` under [`FallbackPolicy::Abort`].
/// - Filesystem errors from the arena.
#[instrument(skip_all, fields(path = %target.path))]
pub fn apply(
    arena: &mut FileArena<'_>,
    loader: &SourceLoader,
    target: &TargetFile,
    desired: Vec<Declaration>,
) -> MortarResult<FileChange> {
    let text = arena.read(&target.path)?;
    let outcome = loader.load(target.path.as_path(), &target.package, text.as_deref())?;

    let status = match &outcome {
        LoadOutcome::Loaded(_) => FileStatus::Updated,
        LoadOutcome::Synthesized {
            cause: SynthesisCause::Missing,
            ..
        } => FileStatus::Created,
        LoadOutcome::Synthesized {
            cause: SynthesisCause::Unparsable(_),
            ..
        } => FileStatus::Regenerated,
    };
    let recovered = outcome.is_recovered();

    let mut file = outcome.into_file();
    let mut actions = Vec::with_capacity(desired.len());
    for decl in desired {
        let label = decl.label();
        let (next, action) = ensure(file, decl);
        file = next;
        debug!(declaration = %label, action = ?action, "Merged");
        if let MergeAction::Conflict(conflict) = action {
            return Err(ApplicationError::MergeConflict {
                path: target.path.as_path().to_path_buf(),
                key: conflict.key.to_string(),
                existing: conflict.existing,
                desired: conflict.desired,
            }
            .into());
        }
        actions.push(action);
    }

    let changed = actions.iter().any(MergeAction::changes_file);
    if !changed && !recovered {
        return Ok(FileChange {
            path: target.path.as_path().to_path_buf(),
            status: FileStatus::Unchanged,
            actions,
        });
    }

    if recovered && loader.policy() == FallbackPolicy::Backup {
        arena.backup(&target.path)?;
    }

    let stats = Stats::of(&file);
    debug!(declarations = ?stats.declarations, members = stats.members, "Rendered");
    arena.stage(&target.path, file.render())?;
    info!(path = %target.path, status = ?status, dry_run = arena.is_dry_run(), "Wrote file");

    Ok(FileChange {
        path: target.path.as_path().to_path_buf(),
        status,
        actions,
    })
}
