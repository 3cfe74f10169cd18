//! Per-run file state keyed by path.
//!
//! Every read goes through the arena: text staged earlier in the run wins over
//! the filesystem, so later components (and later entities) see what earlier
//! ones produced even when nothing is written to disk.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::application::ports::Filesystem;
use crate::domain::RelativePath;
use crate::error::MortarResult;

pub struct FileArena<'fs> {
    fs: &'fs dyn Filesystem,
    root: PathBuf,
    dry_run: bool,
    staged: BTreeMap<RelativePath, String>,
}

impl<'fs> FileArena<'fs> {
    pub fn new(fs: &'fs dyn Filesystem, root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            fs,
            root: root.into(),
            dry_run,
            staged: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Current text at `path`: staged first, then the filesystem.
    pub fn read(&self, path: &RelativePath) -> MortarResult<Option<String>> {
        if let Some(text) = self.staged.get(path) {
            return Ok(Some(text.clone()));
        }
        self.fs.read_to_string(&path.resolve(&self.root))
    }

    /// Record `content` as the new text of `path`, writing it unless dry-run.
    pub fn stage(&mut self, path: &RelativePath, content: String) -> MortarResult<()> {
        if !self.dry_run {
            let absolute = path.resolve(&self.root);
            if let Some(parent) = absolute.parent() {
                self.fs.create_dir_all(parent)?;
            }
            self.fs.write_file(&absolute, &content)?;
        }
        debug!(path = %path, dry_run = self.dry_run, bytes = content.len(), "Staged file");
        self.staged.insert(path.clone(), content);
        Ok(())
    }

    /// Stage `content` only when it differs from the current text.
    ///
    /// Returns whether anything was staged.
    pub fn write_if_changed(&mut self, path: &RelativePath, content: String) -> MortarResult<bool> {
        if self.read(path)?.as_deref() == Some(content.as_str()) {
            return Ok(false);
        }
        self.stage(path, content)?;
        Ok(true)
    }

    /// Copy the on-disk file to `<path>.bak`.
    ///
    /// Returns the backup location, or `None` when nothing is on disk to copy
    /// (the text only exists staged, from a dry run).
    pub fn backup(&self, path: &RelativePath) -> MortarResult<Option<PathBuf>> {
        let absolute = path.resolve(&self.root);
        if !self.fs.exists(&absolute) {
            debug!(path = %path, "No file on disk to back up");
            return Ok(None);
        }
        let target = backup_path(&absolute);
        if self.dry_run {
            warn!(path = %path, backup = %target.display(), "Dry run: would back up unparsable file");
        } else {
            self.fs.copy(&absolute, &target)?;
            warn!(path = %path, backup = %target.display(), "Backed up unparsable file");
        }
        Ok(Some(target))
    }

    /// Paths staged so far, in path order.
    pub fn staged_paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.staged.keys()
    }

    /// Staged text of `path`, if this run produced any.
    pub fn staged(&self, path: &RelativePath) -> Option<&str> {
        self.staged.get(path).map(String::as_str)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::application::ports::MockFilesystem;

    fn rel(path: &str) -> RelativePath {
        RelativePath::new(path)
    }

    #[test]
    fn staged_text_shadows_the_filesystem() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("/out/a.go")))
            .times(1)
            .returning(|_| Ok(Some("package a\n".into())));
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();

        let mut arena = FileArena::new(&fs, "/out", true);
        assert_eq!(arena.read(&rel("a.go")).unwrap().as_deref(), Some("package a\n"));

        arena.stage(&rel("a.go"), "package b\n".into()).unwrap();
        assert_eq!(arena.read(&rel("a.go")).unwrap().as_deref(), Some("package b\n"));
    }

    #[test]
    fn stage_writes_through_when_not_dry_run() {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all()
            .with(eq(PathBuf::from("/out/internal/domain")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_write_file()
            .withf(|path, content| path == Path::new("/out/internal/domain/w.go") && content == "x")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut arena = FileArena::new(&fs, "/out", false);
        arena.stage(&rel("internal/domain/w.go"), "x".into()).unwrap();
        assert_eq!(arena.staged(&rel("internal/domain/w.go")), Some("x"));
    }

    #[test]
    fn unchanged_content_is_not_staged() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .returning(|_| Ok(Some("same".into())));
        fs.expect_write_file().never();

        let mut arena = FileArena::new(&fs, "/out", false);
        assert!(!arena.write_if_changed(&rel("a.sql"), "same".into()).unwrap());
        assert_eq!(arena.staged_paths().count(), 0);
    }

    #[test]
    fn backup_copies_next_to_the_original() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .with(eq(PathBuf::from("/out/a.go")))
            .return_const(true);
        fs.expect_copy()
            .with(eq(PathBuf::from("/out/a.go")), eq(PathBuf::from("/out/a.go.bak")))
            .times(1)
            .returning(|_, _| Ok(()));

        let arena = FileArena::new(&fs, "/out", false);
        assert_eq!(
            arena.backup(&rel("a.go")).unwrap(),
            Some(PathBuf::from("/out/a.go.bak"))
        );
    }

    #[test]
    fn backup_skips_files_missing_from_disk() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);
        fs.expect_copy().never();

        let arena = FileArena::new(&fs, "/out", false);
        assert_eq!(arena.backup(&rel("a.go")).unwrap(), None);
    }
}
