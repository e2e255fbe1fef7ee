// src/config/validate.rs

use crate::config::model::{ArtifactConfig, ArtifactSettings, ConfigFile, RawConfigFile};
use crate::errors::{Result, TestwatchError};
use crate::mapper::MappingConvention;
use crate::types::ArtifactKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TestwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_global_config(&raw)?;

        let mut artifacts = Vec::new();
        for (name, section) in raw.artifact.iter() {
            let kind: ArtifactKind = name.parse()?;
            if !section.enabled {
                continue;
            }
            artifacts.push(resolve_artifact(kind, section)?);
        }
        artifacts.sort_by_key(|a| a.kind);

        ensure_has_artifacts(&artifacts)?;
        validate_coverage(&raw)?;

        Ok(ConfigFile::new_unchecked(raw.config, artifacts, raw.coverage))
    }
}

impl ConfigFile {
    /// Keep only the given kind (used by `--kind`).
    pub fn restrict_to(&mut self, kind: ArtifactKind) -> Result<()> {
        if self.artifact(kind).is_none() {
            return Err(TestwatchError::ConfigError(format!(
                "[artifact.{kind}] is not enabled in the configuration"
            )));
        }
        self.artifacts.retain(|a| a.kind == kind);
        Ok(())
    }
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.interval_ms == 0 {
        return Err(TestwatchError::ConfigError(
            "[config].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_artifacts(artifacts: &[ArtifactSettings]) -> Result<()> {
    if artifacts.is_empty() {
        return Err(TestwatchError::ConfigError(
            "config must enable at least one [artifact.<kind>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_coverage(cfg: &RawConfigFile) -> Result<()> {
    if let Some(coverage) = &cfg.coverage {
        if coverage.cmd.trim().is_empty() {
            return Err(TestwatchError::ConfigError(
                "[coverage].cmd must not be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn resolve_artifact(kind: ArtifactKind, section: &ArtifactConfig) -> Result<ArtifactSettings> {
    let roots = section
        .roots
        .clone()
        .unwrap_or_else(|| ArtifactSettings::default_roots(kind));
    if roots.is_empty() {
        return Err(TestwatchError::ConfigError(format!(
            "[artifact.{kind}].roots must list at least one directory"
        )));
    }
    if roots.iter().any(|r| r.trim().is_empty()) {
        return Err(TestwatchError::ConfigError(format!(
            "[artifact.{kind}].roots must not contain empty entries"
        )));
    }

    let ext = section.source_extension.as_str();
    if ext.is_empty() || ext.contains('.') {
        return Err(TestwatchError::ConfigError(format!(
            "[artifact.{kind}].source_extension must be a bare extension like \"rb\" (got {ext:?})"
        )));
    }

    if section.rails_layout && kind != ArtifactKind::Test {
        return Err(TestwatchError::ConfigError(format!(
            "[artifact.{kind}].rails_layout is only supported for [artifact.test]"
        )));
    }

    let mut convention = if section.rails_layout {
        MappingConvention::rails_test()
    } else {
        MappingConvention::for_kind(kind)
    }
    .with_source_extension(ext);

    for (from, to) in section.rewrite.iter() {
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(TestwatchError::ConfigError(format!(
                "[artifact.{kind}].rewrite entries must have non-empty names (got {from:?} = {to:?})"
            )));
        }
        if from.contains('/') {
            return Err(TestwatchError::ConfigError(format!(
                "[artifact.{kind}].rewrite key {from:?} must be a single directory name"
            )));
        }
        convention = convention.with_rewrite(from.as_str(), to.as_str());
    }

    Ok(ArtifactSettings {
        kind,
        roots,
        ignore: section
            .ignore
            .clone()
            .unwrap_or_else(|| ArtifactSettings::default_ignore(kind)),
        convention,
        source_extensions: section.source_extensions.clone(),
        cmd: section
            .cmd
            .clone()
            .unwrap_or_else(|| ArtifactSettings::default_cmd(kind)),
        opts: section.opts.clone().unwrap_or_default(),
    })
}
