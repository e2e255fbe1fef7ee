// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::mapper::{DEFAULT_SOURCE_EXTENSION, MappingConvention};
use crate::types::ArtifactKind;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// interval_ms = 1000
/// recent_secs = 3600
///
/// [artifact.spec]
/// roots = ["lib", "app", "spec"]
/// ignore = ["spec/spec_helper.rb"]
/// cmd = "spec {artifacts} {opts}"
///
/// [artifact.test]
/// rails_layout = true
///
/// [coverage]
/// cmd = "rcov -T --exclude \"{excludes}\" -Ilib spec -- {artifacts}"
/// ```
///
/// All sections are optional. Without any `[artifact.*]` section only the
/// spec watcher is enabled.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Keys are artifact kind names (`"spec"`, `"test"`).
    #[serde(default = "default_artifact_sections")]
    pub artifact: BTreeMap<String, ArtifactConfig>,

    #[serde(default)]
    pub coverage: Option<CoverageConfig>,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            config: ConfigSection::default(),
            artifact: default_artifact_sections(),
            coverage: None,
        }
    }
}

fn default_artifact_sections() -> BTreeMap<String, ArtifactConfig> {
    let mut sections = BTreeMap::new();
    sections.insert(ArtifactKind::Spec.to_string(), ArtifactConfig::default());
    sections
}

/// `[config]` section: polling behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Delay between the end of one tick and the start of the next.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// When set, the first tick only runs artifacts whose source or artifact
    /// file was modified within this many seconds. Everything else is still
    /// watched.
    #[serde(default)]
    pub recent_secs: Option<u64>,
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            recent_secs: None,
        }
    }
}

impl ConfigSection {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn recent_window(&self) -> Option<Duration> {
        self.recent_secs.map(Duration::from_secs)
    }
}

/// `[artifact.<kind>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Watch roots. Defaults to `lib`, `app` and the kind's own root.
    #[serde(default)]
    pub roots: Option<Vec<String>>,

    /// Artifact paths never handed to the runner. Defaults to the kind's
    /// helper file (`spec/spec_helper.rb` / `test/test_helper.rb`).
    #[serde(default)]
    pub ignore: Option<Vec<String>>,

    /// Extension of source files, without the dot.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Extensions tried when looking for the sources of an artifact.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Rewrite `controllers` → `functional` and `models` → `unit` below the
    /// target root. Only valid for `[artifact.test]`.
    #[serde(default)]
    pub rails_layout: bool,

    /// Additional second-segment rewrites, applied after `rails_layout`.
    #[serde(default)]
    pub rewrite: BTreeMap<String, String>,

    /// Shell command template run for changed artifacts.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Extra options substituted for `{opts}` in `cmd`.
    #[serde(default)]
    pub opts: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

fn default_source_extensions() -> Vec<String> {
    ["rb", "haml", "rhtml", "erb"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            roots: None,
            ignore: None,
            source_extension: default_source_extension(),
            source_extensions: default_source_extensions(),
            rails_layout: false,
            rewrite: BTreeMap::new(),
            cmd: None,
            opts: None,
        }
    }
}

/// `[coverage]` section: command run once on shutdown.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverageConfig {
    pub cmd: String,

    /// Path prefixes substituted (comma separated) for `{excludes}`.
    #[serde(default = "default_coverage_excludes")]
    pub excludes: Vec<String>,
}

fn default_coverage_excludes() -> Vec<String> {
    ["spec/", "db/", "plugins/", "vendor/", "config/"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Fully resolved settings for one enabled artifact kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSettings {
    pub kind: ArtifactKind,
    pub roots: Vec<String>,
    pub ignore: Vec<String>,
    pub convention: MappingConvention,
    pub source_extensions: Vec<String>,
    pub cmd: String,
    pub opts: String,
}

impl ArtifactSettings {
    pub fn default_roots(kind: ArtifactKind) -> Vec<String> {
        vec!["lib".to_string(), "app".to_string(), kind.target_root().to_string()]
    }

    pub fn default_ignore(kind: ArtifactKind) -> Vec<String> {
        vec![format!("{}/{}_helper.rb", kind.target_root(), kind.as_str())]
    }

    pub fn default_cmd(kind: ArtifactKind) -> String {
        match kind {
            ArtifactKind::Spec => "spec {artifacts} {opts}".to_string(),
            ArtifactKind::Test => "ruby -Itest -e 'ARGV.each { |f| load f }' {artifacts}".to_string(),
        }
    }
}

/// Validated configuration.
///
/// Constructed from [`RawConfigFile`] via `TryFrom`, which resolves defaults
/// and drops disabled artifact sections.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    /// Enabled artifact kinds, ordered by kind.
    pub artifacts: Vec<ArtifactSettings>,
    pub coverage: Option<CoverageConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        artifacts: Vec<ArtifactSettings>,
        coverage: Option<CoverageConfig>,
    ) -> Self {
        Self {
            config,
            artifacts,
            coverage,
        }
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactSettings> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}
