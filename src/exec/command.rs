// src/exec/command.rs

use std::collections::BTreeMap;
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::{ConfigFile, CoverageConfig};
use crate::errors::Result;
use crate::types::{Artifact, ArtifactKind};

use super::backend::{ArtifactRunner, CoverageRunner, RunFuture};

/// Placeholder replaced by the space separated artifact paths.
pub const ARTIFACTS_PLACEHOLDER: &str = "{artifacts}";
pub const OPTS_PLACEHOLDER: &str = "{opts}";
pub const EXCLUDES_PLACEHOLDER: &str = "{excludes}";

/// A shell command line with placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub cmd: String,
    pub opts: String,
}

impl CommandTemplate {
    pub fn new(cmd: impl Into<String>, opts: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            opts: opts.into(),
        }
    }

    /// Render the command line for `paths`.
    ///
    /// Paths are appended when the template has no `{artifacts}`
    /// placeholder.
    pub fn render<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> String {
        render(&self.cmd, paths, &self.opts, &[])
    }
}

fn render<'a>(
    template: &str,
    paths: impl IntoIterator<Item = &'a str>,
    opts: &str,
    excludes: &[String],
) -> String {
    let joined = paths
        .into_iter()
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ");

    let mut line = if template.contains(ARTIFACTS_PLACEHOLDER) {
        template.replace(ARTIFACTS_PLACEHOLDER, &joined)
    } else {
        format!("{template} {joined}")
    };
    line = line.replace(OPTS_PLACEHOLDER, opts);
    line = line.replace(EXCLUDES_PLACEHOLDER, &excludes.join(","));
    line.trim_end().to_string()
}

/// Quote `s` for `sh` unless it only contains safe characters.
fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:@%".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Run `line` through the platform shell with inherited stdio.
async fn run_shell(line: &str) -> Result<ExitStatus> {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let status = cmd
        .status()
        .await
        .with_context(|| format!("running command: {line}"))?;
    Ok(status)
}

/// Production artifact runner: one shell command per artifact kind.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    templates: BTreeMap<ArtifactKind, CommandTemplate>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut runner = Self::new();
        for settings in &cfg.artifacts {
            runner = runner.with_template(
                settings.kind,
                CommandTemplate::new(settings.cmd.clone(), settings.opts.clone()),
            );
        }
        runner
    }

    pub fn with_template(mut self, kind: ArtifactKind, template: CommandTemplate) -> Self {
        self.templates.insert(kind, template);
        self
    }

    /// Rendered command lines, one per kind present in `artifacts`.
    pub fn command_lines(&self, artifacts: &[Artifact]) -> Vec<(ArtifactKind, String)> {
        let mut by_kind: BTreeMap<ArtifactKind, Vec<&str>> = BTreeMap::new();
        for artifact in artifacts {
            by_kind
                .entry(artifact.kind)
                .or_default()
                .push(artifact.path.as_str());
        }

        let mut lines = Vec::new();
        for (kind, paths) in by_kind {
            match self.templates.get(&kind) {
                Some(template) => lines.push((kind, template.render(paths))),
                None => warn!(%kind, count = paths.len(), "no command configured; skipping"),
            }
        }
        lines
    }
}

impl ArtifactRunner for CommandRunner {
    fn run_artifacts(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_> {
        let lines = self.command_lines(&artifacts);

        Box::pin(async move {
            for (kind, line) in lines {
                info!(%kind, cmd = %line, "running artifacts");
                let status = run_shell(&line).await?;
                info!(
                    %kind,
                    exit_code = status.code().unwrap_or(-1),
                    success = status.success(),
                    "runner exited"
                );
            }
            Ok(())
        })
    }
}

/// Production coverage runner built from `[coverage]`.
#[derive(Debug, Clone)]
pub struct CoverageCommand {
    cmd: String,
    excludes: Vec<String>,
}

impl CoverageCommand {
    pub fn new(cfg: &CoverageConfig) -> Self {
        Self {
            cmd: cfg.cmd.clone(),
            excludes: cfg.excludes.clone(),
        }
    }

    /// Coverage command for `cfg`, or `None` without a `[coverage]` section.
    ///
    /// The program of every artifact runner command is appended to the
    /// excludes so the runner itself stays out of the report.
    pub fn from_config(cfg: &ConfigFile) -> Option<Self> {
        let mut coverage = Self::new(cfg.coverage.as_ref()?);
        for settings in &cfg.artifacts {
            let Some(program) = runner_program(&settings.cmd) else {
                continue;
            };
            if !coverage.excludes.iter().any(|e| e == program) {
                coverage.excludes.push(program.to_string());
            }
        }
        Some(coverage)
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn command_line(&self, artifacts: &[Artifact]) -> String {
        render(
            &self.cmd,
            artifacts.iter().map(|a| a.path.as_str()),
            "",
            &self.excludes,
        )
    }
}

impl CoverageRunner for CoverageCommand {
    fn run_coverage(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_> {
        Box::pin(async move {
            if artifacts.is_empty() {
                info!("no known artifacts; skipping coverage");
                return Ok(());
            }
            let line = self.command_line(&artifacts);
            info!(cmd = %line, count = artifacts.len(), "running coverage");
            let status = run_shell(&line).await?;
            info!(
                exit_code = status.code().unwrap_or(-1),
                success = status.success(),
                "coverage exited"
            );
            Ok(())
        })
    }
}

/// First word of a runner command line, unless it is a placeholder.
fn runner_program(cmd: &str) -> Option<&str> {
    cmd.split_whitespace().next().filter(|word| !word.starts_with('{'))
}

/// Coverage runner used when no `[coverage]` section is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipCoverage;

impl CoverageRunner for SkipCoverage {
    fn run_coverage(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_> {
        Box::pin(async move {
            info!(count = artifacts.len(), "coverage not configured; skipping");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitutes_artifacts_and_opts() {
        let t = CommandTemplate::new("spec {artifacts} {opts}", "-O spec/spec.opts");
        assert_eq!(
            t.render(["spec/a_spec.rb", "spec/b_spec.rb"]),
            "spec spec/a_spec.rb spec/b_spec.rb -O spec/spec.opts"
        );
    }

    #[test]
    fn template_without_placeholder_appends_and_trims() {
        let t = CommandTemplate::new("rspec", "");
        assert_eq!(t.render(["spec/a_spec.rb"]), "rspec spec/a_spec.rb");
        let t = CommandTemplate::new("spec {artifacts} {opts}", "");
        assert_eq!(t.render(["spec/a_spec.rb"]), "spec spec/a_spec.rb");
    }

    #[test]
    fn unsafe_paths_are_quoted() {
        let t = CommandTemplate::new("spec {artifacts}", "");
        assert_eq!(
            t.render(["spec/my file_spec.rb", "spec/it's_spec.rb"]),
            r"spec 'spec/my file_spec.rb' 'spec/it'\''s_spec.rb'"
        );
    }

    #[test]
    fn command_lines_group_by_kind_and_skip_unconfigured() {
        let runner = CommandRunner::new()
            .with_template(ArtifactKind::Spec, CommandTemplate::new("spec", ""));
        let lines = runner.command_lines(&[
            Artifact::new(ArtifactKind::Spec, "spec/a_spec.rb"),
            Artifact::new(ArtifactKind::Test, "test/a_test.rb"),
            Artifact::new(ArtifactKind::Spec, "spec/b_spec.rb"),
        ]);
        assert_eq!(
            lines,
            [(ArtifactKind::Spec, "spec spec/a_spec.rb spec/b_spec.rb".to_string())]
        );
    }

    #[test]
    fn coverage_from_config_excludes_runner_programs() {
        let cfg = crate::config::ConfigFile::try_from(
            toml::from_str::<crate::config::RawConfigFile>(
                r#"
[artifact.spec]
cmd = "spec {artifacts} {opts}"

[artifact.test]
cmd = "ruby -Itest {artifacts}"

[coverage]
cmd = "rcov --exclude \"{excludes}\" -- {artifacts}"
excludes = ["vendor/", "spec"]
"#,
            )
            .unwrap(),
        )
        .unwrap();

        let cov = CoverageCommand::from_config(&cfg).unwrap();
        assert_eq!(cov.excludes(), ["vendor/", "spec", "ruby"]);
        assert_eq!(
            cov.command_line(&[Artifact::new(ArtifactKind::Spec, "spec/a_spec.rb")]),
            "rcov --exclude \"vendor/,spec,ruby\" -- spec/a_spec.rb"
        );
    }

    #[test]
    fn coverage_from_config_is_none_without_section() {
        let cfg = crate::config::ConfigFile::try_from(crate::config::RawConfigFile::default())
            .unwrap();
        assert!(CoverageCommand::from_config(&cfg).is_none());
    }

    #[test]
    fn coverage_line_joins_excludes() {
        let cov = CoverageCommand::new(&CoverageConfig {
            cmd: "rcov -T --exclude \"{excludes}\" -Ilib spec -- {artifacts}".to_string(),
            excludes: vec!["spec/".to_string(), "db/".to_string()],
        });
        assert_eq!(
            cov.command_line(&[Artifact::new(ArtifactKind::Spec, "spec/a_spec.rb")]),
            "rcov -T --exclude \"spec/,db/\" -Ilib spec -- spec/a_spec.rb"
        );
    }
}
