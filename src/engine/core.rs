// src/engine/core.rs

//! Synchronous change dispatcher.
//!
//! [`ChangeDispatcher::tick`] performs one complete poll cycle: every watcher
//! is diffed, every surfaced pair is tracked so later edits re-trigger, and
//! the de-duplicated run set is returned. It performs filesystem reads but
//! no process spawning and no waiting, so it can be unit tested with
//! `MockFileSystem` and no Tokio runtime.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, trace};

use crate::config::{ArtifactSettings, ConfigFile};
use crate::fs::FileSystem;
use crate::mapper::PathMapper;
use crate::types::{Artifact, ArtifactKind, ChangeEvent};
use crate::watch::DirectoryWatcher;

/// One watcher/mapper pair plus everything the dispatcher remembers about
/// its artifacts.
#[derive(Debug)]
pub struct ArtifactWatch {
    kind: ArtifactKind,
    watcher: DirectoryWatcher,
    mapper: PathMapper,
    ignore: HashSet<String>,
    source_roots: Vec<String>,
    source_extensions: Vec<String>,
    /// Every artifact ever surfaced for this kind. Never shrinks.
    known_artifacts: BTreeSet<String>,
}

impl ArtifactWatch {
    pub fn new(
        kind: ArtifactKind,
        fs: Arc<dyn FileSystem>,
        roots: Vec<String>,
        mapper: PathMapper,
    ) -> Self {
        Self {
            kind,
            watcher: DirectoryWatcher::new(fs, roots.clone()),
            mapper,
            ignore: HashSet::new(),
            source_roots: roots,
            source_extensions: Vec::new(),
            known_artifacts: BTreeSet::new(),
        }
    }

    pub fn from_settings(settings: &ArtifactSettings, fs: Arc<dyn FileSystem>) -> Self {
        Self::new(
            settings.kind,
            fs,
            settings.roots.clone(),
            PathMapper::new(settings.convention.clone()),
        )
        .with_ignore(settings.ignore.iter().cloned())
        .with_source_extensions(settings.source_extensions.iter().cloned())
    }

    pub fn with_ignore<I, S>(mut self, ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(ignore.into_iter().map(Into::into));
        self
    }

    pub fn with_source_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn watcher(&self) -> &DirectoryWatcher {
        &self.watcher
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    pub fn known_artifacts(&self) -> &BTreeSet<String> {
        &self.known_artifacts
    }

    /// Run the composite diff and record baselines for what it surfaced.
    fn poll(&mut self, fs: &dyn FileSystem) -> Vec<ChangeEvent> {
        let mapper = &self.mapper;
        let events = self.watcher.diff_new_or_changed_with_artifact(
            |file| mapper.artifact_for(file),
            &self.ignore,
            |artifact| fs.exists(artifact),
        );

        for event in &events {
            self.watcher.track(&event.file);
            self.watcher.track(&event.artifact);

            if self.known_artifacts.insert(event.artifact.clone()) {
                // First sighting: also watch every existing source of this
                // artifact, not just the file that happened to surface it.
                let sources = self.mapper.sources_for(
                    &event.artifact,
                    &self.source_roots,
                    &self.source_extensions,
                );
                for source in sources {
                    if !self.watcher.is_tracked(&source) && fs.exists(&source) {
                        trace!(kind = %self.kind, file = %source, "tracking source of new artifact");
                        self.watcher.track(&source);
                    }
                }
            }
        }
        events
    }
}

/// Drives every [`ArtifactWatch`] through one poll cycle per tick.
pub struct ChangeDispatcher {
    fs: Arc<dyn FileSystem>,
    watches: Vec<ArtifactWatch>,
    recent_window: Option<Duration>,
    ticks: u64,
}

impl fmt::Debug for ChangeDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeDispatcher")
            .field("watches", &self.watches)
            .field("recent_window", &self.recent_window)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl ChangeDispatcher {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            watches: Vec::new(),
            recent_window: None,
            ticks: 0,
        }
    }

    /// One watch per enabled artifact kind, in kind order.
    pub fn from_config(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> Self {
        let mut dispatcher =
            Self::new(Arc::clone(&fs)).with_recent_window(cfg.config.recent_window());
        for settings in &cfg.artifacts {
            dispatcher = dispatcher.with_watch(ArtifactWatch::from_settings(settings, Arc::clone(&fs)));
        }
        dispatcher
    }

    pub fn with_watch(mut self, watch: ArtifactWatch) -> Self {
        self.watches.push(watch);
        self
    }

    /// Limit the first tick to recently modified files.
    pub fn with_recent_window(mut self, window: Option<Duration>) -> Self {
        self.recent_window = window;
        self
    }

    pub fn watches(&self) -> &[ArtifactWatch] {
        &self.watches
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Accumulated artifacts for `kind`; empty when the kind is not watched.
    pub fn known_artifacts(&self, kind: ArtifactKind) -> BTreeSet<String> {
        self.watches
            .iter()
            .filter(|w| w.kind == kind)
            .flat_map(|w| w.known_artifacts.iter().cloned())
            .collect()
    }

    /// Whether any watch has surfaced at least one artifact so far.
    pub fn has_known_artifacts(&self) -> bool {
        self.watches.iter().any(|w| !w.known_artifacts.is_empty())
    }

    /// One poll cycle, returning the artifacts to run.
    pub fn tick(&mut self) -> Vec<Artifact> {
        self.tick_at(SystemTime::now())
    }

    /// [`tick`](Self::tick) with an explicit "now" for the recency filter.
    pub fn tick_at(&mut self, now: SystemTime) -> Vec<Artifact> {
        let window = if self.ticks == 0 { self.recent_window } else { None };
        self.ticks += 1;

        let fs = self.fs.as_ref();
        let mut run = BTreeSet::new();

        for watch in &mut self.watches {
            let kind = watch.kind;
            for event in watch.poll(fs) {
                if let Some(window) = window {
                    let recent = modified_within(fs, &event.file, now, window)
                        || modified_within(fs, &event.artifact, now, window);
                    if !recent {
                        trace!(%kind, file = %event.file, "not recently modified; skipping on first run");
                        continue;
                    }
                }
                debug!(%kind, file = %event.file, artifact = %event.artifact, "change mapped to artifact");
                run.insert(Artifact::new(kind, event.artifact));
            }
        }

        trace!(tick = self.ticks, count = run.len(), "tick complete");
        run.into_iter().collect()
    }

    /// Every known artifact that still exists, for the shutdown pass.
    pub fn coverage_targets(&self) -> Vec<Artifact> {
        let targets: BTreeSet<Artifact> = self
            .watches
            .iter()
            .flat_map(|w| {
                w.known_artifacts
                    .iter()
                    .map(move |path| Artifact::new(w.kind, path.clone()))
            })
            .filter(|a| self.fs.exists(&a.path))
            .collect();
        targets.into_iter().collect()
    }
}

fn modified_within(fs: &dyn FileSystem, path: &str, now: SystemTime, window: Duration) -> bool {
    match fs.modified(path) {
        // A timestamp in the future counts as recent.
        Ok(mtime) => now.duration_since(mtime).map_or(true, |age| age <= window),
        Err(_) => false,
    }
}
