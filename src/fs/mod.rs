// src/fs/mod.rs

//! Filesystem access used by the watcher.
//!
//! The watcher only ever needs three things from the filesystem: a recursive
//! listing, a per-file modification time and an existence check. File
//! contents are never read.

use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Every entry reachable beneath `root`, in traversal order.
    ///
    /// A missing or unreadable root yields an empty listing.
    fn list_recursive(&self, root: &str) -> Vec<String>;

    /// Last modification time of `path`.
    fn modified(&self, path: &str) -> io::Result<SystemTime>;

    fn exists(&self, path: &str) -> bool;
}

/// Implementation backed by `std::fs` and a `walkdir` traversal.
///
/// Listing follows shell globstar conventions: dot-entries are skipped and
/// symlinked directories are listed but never descended into.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

impl FileSystem for RealFileSystem {
    fn list_recursive(&self, root: &str) -> Vec<String> {
        let root = if root.is_empty() { "." } else { root };
        let base = match root.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        WalkDir::new(base)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path().to_string_lossy().into_owned()),
                Err(err) => {
                    debug!(root, error = %err, "skipping unreadable entry");
                    None
                }
            })
            .collect()
    }

    fn modified(&self, path: &str) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}
