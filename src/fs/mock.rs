// src/fs/mock.rs

use super::FileSystem;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// In-memory filesystem with settable modification times.
///
/// Only files are modelled; listings return them in insertion order. Clones
/// share the same state, so a test can keep a handle while the watcher owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<Vec<(String, SystemTime)>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp `secs` seconds after the epoch.
    pub fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    /// Create `path` (or update it) with a modification time of `secs`.
    pub fn add_file(&self, path: impl Into<String>, secs: u64) {
        self.set_modified(path, Self::at(secs));
    }

    pub fn set_modified(&self, path: impl Into<String>, mtime: SystemTime) {
        let path = path.into();
        let mut files = self.files.lock().unwrap();
        match files.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = mtime,
            None => files.push((path, mtime)),
        }
    }

    pub fn remove(&self, path: &str) {
        self.files.lock().unwrap().retain(|(p, _)| p != path);
    }
}

impl FileSystem for MockFileSystem {
    fn list_recursive(&self, root: &str) -> Vec<String> {
        let prefix = format!("{}/", root.trim_end_matches('/'));
        let files = self.files.lock().unwrap();
        files
            .iter()
            .filter(|(p, _)| p.starts_with(&prefix))
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn modified(&self, path: &str) -> io::Result<SystemTime> {
        let files = self.files.lock().unwrap();
        files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, mtime)| *mtime)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("file not found: {path}"))
            })
    }

    fn exists(&self, path: &str) -> bool {
        let files = self.files.lock().unwrap();
        files.iter().any(|(p, _)| p == path)
    }
}
