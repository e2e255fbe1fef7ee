// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod mapper;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::engine::{ChangeDispatcher, Runtime, RuntimeOptions};
use crate::exec::{CommandRunner, CoverageCommand, SkipCoverage};
use crate::fs::{FileSystem, RealFileSystem};
use crate::mapper::PathMapper;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with `--kind` / `--interval-ms` overrides)
/// - one watcher per enabled artifact kind
/// - the shell command runners
/// - Ctrl-C handling via a cancellation token
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref().map(Path::new))?;
    if let Some(kind) = args.kind {
        cfg.restrict_to(kind)?;
    }
    if let Some(ms) = args.interval_ms {
        cfg.config.interval_ms = ms;
    }

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let core = ChangeDispatcher::from_config(&cfg, fs);
    let runner = CommandRunner::from_config(&cfg);

    // Ctrl-C only cancels; the loop notices at the next tick boundary.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            cancel.cancel();
        });
    }

    let options = RuntimeOptions {
        interval: cfg.config.interval(),
        once: args.once,
    };

    let kinds: Vec<_> = cfg.artifacts.iter().map(|a| a.kind).collect();
    info!(?kinds, "watching for changes");

    match CoverageCommand::from_config(&cfg) {
        Some(coverage) => {
            Runtime::new(core, runner, coverage, options, cancel)
                .run()
                .await?
        }
        None => Runtime::new(core, runner, SkipCoverage, options, cancel).run().await?,
    }
    Ok(())
}

/// Simple dry-run output: print the resolved settings and a sample mapping
/// per kind.
fn print_dry_run(cfg: &ConfigFile) {
    println!("testwatch dry-run");
    println!("  config.interval_ms = {}", cfg.config.interval_ms);
    if let Some(secs) = cfg.config.recent_secs {
        println!("  config.recent_secs = {secs}");
    }
    println!();

    println!("artifacts ({}):", cfg.artifacts.len());
    for settings in &cfg.artifacts {
        let conv = &settings.convention;
        println!("  - {}", settings.kind);
        println!("      roots: {:?}", settings.roots);
        if !settings.ignore.is_empty() {
            println!("      ignore: {:?}", settings.ignore);
        }
        println!("      source_extension: {}", conv.source_extension());
        if !conv.rewrites().is_empty() {
            println!("      rewrites: {:?}", conv.rewrites());
        }
        println!("      cmd: {}", settings.cmd);
        if !settings.opts.is_empty() {
            println!("      opts: {}", settings.opts);
        }
        let sample = format!("lib/example.{}", conv.source_extension());
        let mapper = PathMapper::new(conv.clone());
        println!("      e.g. {sample} -> {}", mapper.artifact_for(&sample));
    }

    if let (Some(coverage), Some(command)) = (&cfg.coverage, CoverageCommand::from_config(cfg)) {
        println!();
        println!("coverage:");
        println!("  cmd: {}", coverage.cmd);
        println!("  excludes: {:?}", command.excludes());
    }

    debug!("dry-run complete (nothing watched)");
}
