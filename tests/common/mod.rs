//! Common test utilities for cmsync scenario tests.
//!
//! - `Workspace`: canonicalized temp directory with file helpers
//! - `EventLog`: records events emitted by a session
//! - `wait_until`: bounded polling for conditions driven by other threads

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Isolated directory tree. `root` is canonical so it matches watcher paths.
pub struct Workspace {
    _dir: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        Self { _dir: dir, root }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn remove(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::remove_file(&path).unwrap();
        path
    }
}

/// Collects events from a session callback
pub struct EventLog<E> {
    events: RefCell<Vec<E>>,
}

impl<E: Clone> EventLog<E> {
    pub fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn sink(&self) -> impl Fn(E) + '_ {
        move |e| self.events.borrow_mut().push(e)
    }

    pub fn all(&self) -> Vec<E> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&E) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

/// Poll `cond` until it holds or `timeout` elapses. Returns the last result.
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    cond()
}

/// Path relative to `base`, with forward slashes
pub fn rel(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}
