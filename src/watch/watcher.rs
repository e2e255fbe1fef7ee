// src/watch/watcher.rs

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{debug, trace, warn};

use crate::fs::FileSystem;
use crate::types::ChangeEvent;

/// Polling watcher over a fixed set of root directories.
///
/// State:
/// - `roots`: directories to list, in the order given (duplicates kept).
/// - `known`: the listing produced by the most recent enumeration.
/// - `mtimes`: baseline modification times of *tracked* paths only.
///
/// All state lives for the lifetime of the watcher; nothing is persisted and
/// nothing is evicted when files disappear.
pub struct DirectoryWatcher {
    fs: Arc<dyn FileSystem>,
    roots: Vec<String>,
    known: Vec<String>,
    mtimes: HashMap<String, SystemTime>,
}

impl fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("roots", &self.roots)
            .field("known", &self.known.len())
            .field("tracked", &self.mtimes.len())
            .finish_non_exhaustive()
    }
}

impl DirectoryWatcher {
    pub fn new<I, S>(fs: Arc<dyn FileSystem>, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fs,
            roots: roots.into_iter().map(Into::into).collect(),
            known: Vec::new(),
            mtimes: HashMap::new(),
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Listing from the most recent enumeration.
    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Stored baseline timestamp for `path`, if it has been tracked.
    pub fn tracked_mtime(&self, path: &str) -> Option<SystemTime> {
        self.mtimes.get(path).copied()
    }

    pub fn is_tracked(&self, path: &str) -> bool {
        self.mtimes.contains_key(path)
    }

    /// List every root recursively and replace the known set with the result.
    ///
    /// Per-root listings are concatenated in root order; no sorting, filtering
    /// or de-duplication across roots is applied.
    pub fn enumerate(&mut self) -> &[String] {
        let mut listing = Vec::new();
        for root in &self.roots {
            let entries = self.fs.list_recursive(root);
            trace!(root = %root, count = entries.len(), "listed watch root");
            listing.extend(entries);
        }
        self.known = listing;
        &self.known
    }

    /// Enumerate, then return every path absent from the previous listing.
    ///
    /// Paths come back in the order of the new listing.
    pub fn diff_new(&mut self) -> Vec<String> {
        let previous: HashSet<String> = std::mem::take(&mut self.known).into_iter().collect();
        self.enumerate();
        let new_files: Vec<String> = self
            .known
            .iter()
            .filter(|path| !previous.contains(*path))
            .cloned()
            .collect();
        if !new_files.is_empty() {
            debug!(count = new_files.len(), "new files detected");
        }
        new_files
    }

    /// Return every tracked, known path whose timestamp differs from its
    /// baseline, updating the baseline as it goes.
    ///
    /// Untracked paths are skipped. A path whose timestamp cannot be read
    /// (e.g. it vanished since the last enumeration) counts as unchanged.
    pub fn diff_changed(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        for path in &self.known {
            let Some(stored) = self.mtimes.get(path).copied() else {
                continue;
            };
            let Some(current) = read_mtime(self.fs.as_ref(), path) else {
                continue;
            };
            if current != stored {
                debug!(file = %path, "timestamp changed");
                self.mtimes.insert(path.clone(), current);
                changed.push(path.clone());
            }
        }
        changed
    }

    /// Record the current timestamp of `path` as its baseline.
    ///
    /// Tracking is idempotent and works for paths outside the known set
    /// (e.g. artifacts). A path that cannot be read is left untracked.
    pub fn track(&mut self, path: &str) {
        if let Some(mtime) = read_mtime(self.fs.as_ref(), path) {
            self.mtimes.insert(path.to_string(), mtime);
        }
    }

    /// New files followed by changed files, each mapped to an artifact.
    ///
    /// Pairs whose artifact is in `ignore` or for which `exists` is false are
    /// dropped. Each artifact is yielded at most once per call; the first
    /// file that maps to it wins, across the new/changed boundary.
    pub fn diff_new_or_changed_with_artifact<M, E>(
        &mut self,
        mapper: M,
        ignore: &HashSet<String>,
        exists: E,
    ) -> Vec<ChangeEvent>
    where
        M: Fn(&str) -> String,
        E: Fn(&str) -> bool,
    {
        let new_files = self.diff_new();
        let changed_files = self.diff_changed();

        let mut yielded: HashSet<String> = HashSet::new();
        let mut events = Vec::new();

        for file in new_files.into_iter().chain(changed_files) {
            let artifact = mapper(&file);
            if yielded.contains(&artifact) || ignore.contains(&artifact) {
                continue;
            }
            if !exists(&artifact) {
                continue;
            }
            yielded.insert(artifact.clone());
            events.push(ChangeEvent::new(file, artifact));
        }
        events
    }
}

fn read_mtime(fs: &dyn FileSystem, path: &str) -> Option<SystemTime> {
    match fs.modified(path) {
        Ok(mtime) => Some(mtime),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(file = %path, "file vanished before its timestamp could be read");
            None
        }
        Err(err) => {
            warn!(file = %path, error = %err, "failed to read modification time");
            None
        }
    }
}
