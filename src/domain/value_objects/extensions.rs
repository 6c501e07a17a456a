//! Allowed file extensions for remote upload

use std::collections::BTreeSet;
use std::path::Path;

/// Extensions the remote file system accepts
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "css", "js", "json", "html", "txt", "md", "jpg", "jpeg", "png", "gif", "map", "svg", "ttf",
    "woff", "woff2", "zip", "ico", "eot", "otf", "webp",
];

/// Case-insensitive extension allowlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedExtensions {
    extensions: BTreeSet<String>,
}

impl Default for AllowedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EXTENSIONS.iter().copied())
    }
}

impl AllowedExtensions {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Check whether a file's extension is on the allowlist
    pub fn allows(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
