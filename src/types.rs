// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::TestwatchError;

/// Which family of test artifacts a watcher resolves changed files to.
///
/// - `Spec`: `spec/**/*_spec.rb` style artifacts.
/// - `Test`: `test/**/*_test.rb` style artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Spec,
    Test,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Spec, ArtifactKind::Test];

    /// Name of the directory all artifacts of this kind live under.
    pub fn target_root(self) -> &'static str {
        match self {
            ArtifactKind::Spec => "spec",
            ArtifactKind::Test => "test",
        }
    }

    /// Basename suffix placed before the source extension.
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Spec => "_spec",
            ArtifactKind::Test => "_test",
        }
    }

    pub fn as_str(self) -> &'static str {
        self.target_root()
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = TestwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spec" => Ok(ArtifactKind::Spec),
            "test" => Ok(ArtifactKind::Test),
            other => Err(TestwatchError::UnknownArtifactKind(other.to_string())),
        }
    }
}

/// A derived test artifact, as handed to the runner collaborator.
///
/// Ordering is by kind first, then path, so a batch groups naturally.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: String,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.path)
    }
}

/// One detected change: a source file and the artifact derived from it.
///
/// Produced and consumed within a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub file: String,
    pub artifact: String,
}

impl ChangeEvent {
    pub fn new(file: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            artifact: artifact.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_case_insensitively() {
        assert_eq!("Spec".parse::<ArtifactKind>().unwrap(), ArtifactKind::Spec);
        assert_eq!(" test ".parse::<ArtifactKind>().unwrap(), ArtifactKind::Test);
        assert!(matches!(
            "feature".parse::<ArtifactKind>(),
            Err(TestwatchError::UnknownArtifactKind(k)) if k == "feature"
        ));
    }

    #[test]
    fn artifacts_sort_by_kind_then_path() {
        let mut v = vec![
            Artifact::new(ArtifactKind::Test, "test/a_test.rb"),
            Artifact::new(ArtifactKind::Spec, "spec/z_spec.rb"),
            Artifact::new(ArtifactKind::Spec, "spec/a_spec.rb"),
        ];
        v.sort();
        let paths: Vec<_> = v.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, ["spec/a_spec.rb", "spec/z_spec.rb", "test/a_test.rb"]);
    }
}
