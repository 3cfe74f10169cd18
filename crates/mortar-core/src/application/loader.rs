//! Source loader: file text → [`SourceFile`], or a synthesized skeleton.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::ApplicationError;
use crate::domain::{ParseError, SourceFile, parse};
use crate::error::MortarResult;

/// What to do with an existing file that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Treat the file as absent and regenerate it.
    Overwrite,
    /// Copy the file to `<path>.bak`, then regenerate it.
    #[default]
    Backup,
    /// Leave the file alone and report a file-scoped error.
    Abort,
}

impl FallbackPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Backup => "backup",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "backup" => Ok(Self::Backup),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown parse-failure policy '{other}' (expected overwrite, backup or abort)"
            )),
        }
    }
}

/// Why a skeleton was synthesized instead of loading the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisCause {
    Missing,
    Unparsable(ParseError),
}

/// Tagged result of [`SourceLoader::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(SourceFile),
    Synthesized {
        file: SourceFile,
        cause: SynthesisCause,
    },
}

impl LoadOutcome {
    pub fn file(&self) -> &SourceFile {
        match self {
            Self::Loaded(file) | Self::Synthesized { file, .. } => file,
        }
    }

    pub fn into_file(self) -> SourceFile {
        match self {
            Self::Loaded(file) | Self::Synthesized { file, .. } => file,
        }
    }

    /// The file existed but could not be parsed.
    pub fn is_recovered(&self) -> bool {
        matches!(
            self,
            Self::Synthesized {
                cause: SynthesisCause::Unparsable(_),
                ..
            }
        )
    }
}

/// Parses existing files, falling back to a skeleton per [`FallbackPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceLoader {
    policy: FallbackPolicy,
}

impl SourceLoader {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Load `text` (the current content at `path`, if any).
    ///
    /// # Errors
    ///
    /// `ApplicationError::UnparsableSource` when the text does not parse and
    /// the policy is [`FallbackPolicy::Abort`].
    pub fn load(&self, path: &Path, package: &str, text: Option<&str>) -> MortarResult<LoadOutcome> {
        let Some(text) = text else {
            return Ok(LoadOutcome::Synthesized {
                file: SourceFile::skeleton(path, package),
                cause: SynthesisCause::Missing,
            });
        };

        match parse(path, text) {
            Ok(file) => Ok(LoadOutcome::Loaded(file)),
            Err(err) if self.policy == FallbackPolicy::Abort => {
                warn!(path = %path.display(), error = %err, "Unparsable file left untouched");
                Err(ApplicationError::UnparsableSource {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                }
                .into())
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    policy = %self.policy,
                    "Unparsable file will be regenerated from a skeleton"
                );
                Ok(LoadOutcome::Synthesized {
                    file: SourceFile::skeleton(path, package),
                    cause: SynthesisCause::Unparsable(err),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MortarError;

    const PATH: &str = "internal/domain/widget.go";

    #[test]
    fn missing_file_synthesizes_skeleton() {
        let outcome = SourceLoader::default()
            .load(Path::new(PATH), "domain", None)
            .unwrap();
        assert!(matches!(
            outcome,
            LoadOutcome::Synthesized {
                cause: SynthesisCause::Missing,
                ..
            }
        ));
        assert_eq!(outcome.file().render(), "package domain\n");
    }

    #[test]
    fn parseable_file_is_loaded() {
        let outcome = SourceLoader::default()
            .load(Path::new(PATH), "domain", Some("package domain\n\ntype A int\n"))
            .unwrap();
        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert!(!outcome.is_recovered());
    }

    #[test]
    fn broken_file_is_recovered_unless_aborting() {
        let broken = Some("package domain\n\nfunc Broken( {\n");

        let outcome = SourceLoader::new(FallbackPolicy::Overwrite)
            .load(Path::new(PATH), "domain", broken)
            .unwrap();
        assert!(outcome.is_recovered());
        assert_eq!(outcome.into_file().package(), "domain");

        let err = SourceLoader::new(FallbackPolicy::Abort)
            .load(Path::new(PATH), "domain", broken)
            .unwrap_err();
        assert!(matches!(
            err,
            MortarError::Application(ApplicationError::UnparsableSource { .. })
        ));
    }

    #[test]
    fn policy_parses_from_str() {
        assert_eq!("BACKUP".parse::<FallbackPolicy>(), Ok(FallbackPolicy::Backup));
        assert!("ignore".parse::<FallbackPolicy>().is_err());
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::Backup);
    }
}
