// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::ArtifactKind;

/// Command-line arguments for `testwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "testwatch",
    version,
    about = "Watch source directories and re-run the specs and tests affected by each change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Testwatch.toml` in the current working directory, or the
    /// built-in defaults when that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Poll once, run whatever that finds, then exit.
    #[arg(long)]
    pub once: bool,

    /// Only watch one artifact kind (spec or test).
    #[arg(long, value_name = "KIND")]
    pub kind: Option<ArtifactKind>,

    /// Override `[config].interval_ms`.
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TESTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved configuration, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_interval() {
        let args =
            CliArgs::try_parse_from(["testwatch", "--kind", "test", "--interval-ms", "250"]).unwrap();
        assert_eq!(args.kind, Some(ArtifactKind::Test));
        assert_eq!(args.interval_ms, Some(250));
        assert!(args.config.is_none());
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(CliArgs::try_parse_from(["testwatch", "--interval-ms", "0"]).is_err());
    }
}
