#![allow(dead_code)]

use std::collections::BTreeMap;
use testwatch::config::{ArtifactConfig, ConfigFile, ConfigSection, CoverageConfig, RawConfigFile};
use testwatch::types::ArtifactKind;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts with no artifact sections at all; add at least one.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                artifact: BTreeMap::new(),
                coverage: None,
            },
        }
    }

    pub fn with_artifact(mut self, kind: ArtifactKind, artifact: ArtifactConfig) -> Self {
        self.config.artifact.insert(kind.to_string(), artifact);
        self
    }

    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.config.config.interval_ms = ms;
        self
    }

    pub fn with_recent_secs(mut self, secs: u64) -> Self {
        self.config.config.recent_secs = Some(secs);
        self
    }

    pub fn with_coverage(mut self, cmd: &str) -> Self {
        let excludes = self
            .config
            .coverage
            .take()
            .map(|c| c.excludes)
            .unwrap_or_default();
        self.config.coverage = Some(CoverageConfig {
            cmd: cmd.to_string(),
            excludes,
        });
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ArtifactConfig`.
pub struct ArtifactConfigBuilder {
    artifact: ArtifactConfig,
}

impl ArtifactConfigBuilder {
    pub fn new() -> Self {
        Self {
            artifact: ArtifactConfig::default(),
        }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.artifact
            .roots
            .get_or_insert_with(Vec::new)
            .push(root.to_string());
        self
    }

    pub fn ignore(mut self, path: &str) -> Self {
        self.artifact
            .ignore
            .get_or_insert_with(Vec::new)
            .push(path.to_string());
        self
    }

    pub fn rails_layout(mut self, val: bool) -> Self {
        self.artifact.rails_layout = val;
        self
    }

    pub fn rewrite(mut self, from: &str, to: &str) -> Self {
        self.artifact
            .rewrite
            .insert(from.to_string(), to.to_string());
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.artifact.cmd = Some(cmd.to_string());
        self
    }

    pub fn enabled(mut self, val: bool) -> Self {
        self.artifact.enabled = val;
        self
    }

    pub fn build(self) -> ArtifactConfig {
        self.artifact
    }
}

impl Default for ArtifactConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
