use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Location of a generated file, relative to the output root.
///
/// Components build these from `format!` strings, so construction never
/// fails: root and `.` components are dropped, leaving a path that can only
/// land under the root it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let normal = path
            .as_ref()
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        Self(normal)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Absolute location under the output `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_paths_are_kept_as_is() {
        let p = RelativePath::new("internal/domain/widget.go");
        assert_eq!(p.as_path(), Path::new("internal/domain/widget.go"));
        assert_eq!(p.to_string(), "internal/domain/widget.go");
    }

    #[test]
    fn root_and_parent_components_cannot_escape() {
        assert_eq!(
            RelativePath::new("/etc/passwd").as_path(),
            Path::new("etc/passwd")
        );
        assert_eq!(
            RelativePath::new("./../schema/x.sql").as_path(),
            Path::new("schema/x.sql")
        );
    }

    #[test]
    fn resolves_under_root() {
        let p = RelativePath::from("api/proto/widget.proto");
        assert_eq!(
            p.resolve(Path::new("/out")),
            PathBuf::from("/out/api/proto/widget.proto")
        );
    }
}
