//! Recursive file listing for the initial upload

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{SyncError, SyncResult};

/// List every regular file under `root`, sorted.
///
/// Hidden files are included and no git ignore semantics apply; callers run
/// their own ignore filter over the result. Unreadable entries are skipped.
pub fn walk_files(root: &Path) -> SyncResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SyncError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => tracing::warn!("skipping unreadable entry: {}", e),
        }
    }
    Ok(files)
}
