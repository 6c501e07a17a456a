//! Filesystem watch primitive
//!
//! Wraps `notify::RecommendedWatcher` and normalizes platform notifications
//! into `FsEvent`s. Paths matched by the ignore filter never leave the
//! watcher callback.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::domain::entities::FsEvent;
use crate::domain::ports::IgnoreFilter;
use crate::error::{SyncError, SyncResult};

use super::walk::walk_files;

/// A registered recursive watch. Dropping it stops the watch.
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl std::fmt::Debug for FsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsWatcher").field("root", &self.root).finish()
    }
}

impl FsWatcher {
    /// Register a recursive watch on `root`.
    ///
    /// Returns once the watch is registered (the ready signal); from then on
    /// every change is delivered to `on_event` from the watcher's thread.
    pub fn start<F>(root: &Path, ignored: Arc<dyn IgnoreFilter>, on_event: F) -> SyncResult<Self>
    where
        F: Fn(FsEvent) + Send + 'static,
    {
        if !root.is_dir() {
            return Err(SyncError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    for fs_event in translate(&event) {
                        if ignored.should_ignore(&fs_event.path) {
                            continue;
                        }
                        on_event(fs_event);
                    }
                }
                Err(e) => tracing::warn!("watch error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::debug!("watching {}", root.display());

        Ok(Self {
            _watcher: watcher,
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Map one notify event to zero or more `FsEvent`s.
///
/// Directories are never reported as added; the files inside them are.
/// Renames are split into an unlink of the old path and an add of the new one.
/// Paired `RenameMode::Both` events are skipped because the backends that
/// produce them also report each half separately.
pub fn translate(event: &Event) -> Vec<FsEvent> {
    let mut out = Vec::new();
    match event.kind {
        EventKind::Create(CreateKind::Folder) => {
            for path in &event.paths {
                add_tree(path, &mut out);
            }
        }
        EventKind::Create(_) => {
            for path in &event.paths {
                add_path(path, &mut out);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {}
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            out.extend(event.paths.iter().map(FsEvent::unlink));
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            for path in &event.paths {
                add_path(path, &mut out);
            }
        }
        EventKind::Modify(ModifyKind::Name(_)) => {
            // Backends that cannot tell the halves apart report each path once.
            for path in &event.paths {
                if path.exists() {
                    add_path(path, &mut out);
                } else {
                    out.push(FsEvent::unlink(path));
                }
            }
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => {}
        EventKind::Modify(_) => {
            out.extend(
                event
                    .paths
                    .iter()
                    .filter(|p| p.is_file())
                    .map(FsEvent::change),
            );
        }
        EventKind::Remove(RemoveKind::Folder) => {
            out.extend(event.paths.iter().map(FsEvent::unlink_dir));
        }
        EventKind::Remove(_) => {
            out.extend(event.paths.iter().map(FsEvent::unlink));
        }
        EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
    }
    out
}

fn add_path(path: &Path, out: &mut Vec<FsEvent>) {
    if path.is_dir() {
        add_tree(path, out);
    } else if path.is_file() {
        out.push(FsEvent::add(path));
    }
}

/// A directory that appears with content (moved in, copied recursively) gets
/// no per-file notifications, so its files are reported here.
fn add_tree(dir: &Path, out: &mut Vec<FsEvent>) {
    match walk_files(dir) {
        Ok(files) => out.extend(files.into_iter().map(FsEvent::add)),
        Err(e) => tracing::debug!("cannot list new directory {}: {}", dir.display(), e),
    }
}
