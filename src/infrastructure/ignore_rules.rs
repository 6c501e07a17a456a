//! Ignore rules for watched trees
//!
//! Gitignore-compatible matching (via the `ignore` crate) over three sources:
//! built-in patterns, the ignore file at the watch root, and explicitly
//! ignored paths such as the change notify file.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::domain::ports::IgnoreFilter;
use crate::error::{SyncError, SyncResult};

/// Default name of the ignore file looked up at the watch root
pub const DEFAULT_IGNORE_FILE: &str = ".cmsignore";

/// Patterns that are never synchronized
pub const DEFAULT_PATTERNS: &[&str] = &[
    ".DS_Store",
    ".git",
    "node_modules",
    "*.swp",
    "*.log",
    ".cmsignore",
    "cmsync.toml",
    "cmsproject.json",
];

/// Maximum ignore file size (64KB)
const MAX_FILE_SIZE: u64 = 65536;

#[derive(Debug)]
pub struct IgnoreRules {
    root: PathBuf,
    matcher: Gitignore,
    explicit: Vec<PathBuf>,
    pattern_count: usize,
}

impl IgnoreRules {
    /// Built-in patterns only
    pub fn defaults(root: &Path) -> SyncResult<Self> {
        Self::from_content(root, None, "")
    }

    /// Built-in patterns plus `root/<ignore_file>` when it exists
    pub fn load(root: &Path, ignore_file: &str) -> SyncResult<Self> {
        let path = root.join(ignore_file);
        if !path.is_file() {
            return Self::defaults(root);
        }

        let size = fs::metadata(&path)?.len();
        if size > MAX_FILE_SIZE {
            return Err(SyncError::InvalidIgnorePattern {
                file: path,
                line: 0,
                message: format!("file is {} bytes, limit is {}", size, MAX_FILE_SIZE),
            });
        }
        let content = fs::read_to_string(&path)?;
        Self::from_content(root, Some(&path), &content)
    }

    /// Built-in patterns plus the patterns in `content`
    pub fn from_content(root: &Path, source: Option<&Path>, content: &str) -> SyncResult<Self> {
        let source_path = source.map(Path::to_path_buf);
        let invalid = |line: usize, message: String| SyncError::InvalidIgnorePattern {
            file: source_path.clone().unwrap_or_else(|| root.to_path_buf()),
            line,
            message,
        };

        let mut builder = GitignoreBuilder::new(root);
        for pattern in DEFAULT_PATTERNS {
            builder
                .add_line(None, pattern)
                .map_err(|e| invalid(0, e.to_string()))?;
        }

        let mut pattern_count = 0;
        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            builder
                .add_line(source_path.clone(), line)
                .map_err(|e| invalid(line_num + 1, e.to_string()))?;
            pattern_count += 1;
        }

        let matcher = builder.build().map_err(|e| invalid(0, e.to_string()))?;
        Ok(Self {
            root: root.to_path_buf(),
            matcher,
            explicit: Vec::new(),
            pattern_count,
        })
    }

    /// Also ignore this exact path
    pub fn with_path(mut self, path: &Path) -> Self {
        self.explicit.push(normalize(path));
        self
    }

    /// Number of patterns loaded from the ignore file
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        if !self.explicit.is_empty() {
            let normalized = normalize(path);
            if self.explicit.iter().any(|p| *p == normalized) {
                return true;
            }
        }

        // The matcher only accepts paths under its root.
        let relative = if path.is_absolute() {
            match path.strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => return false,
            }
        } else {
            path
        };
        if relative.as_os_str().is_empty() {
            return false;
        }

        self.matcher
            .matched_path_or_any_parents(relative, path.is_dir())
            .is_ignore()
    }
}

impl IgnoreFilter for IgnoreRules {
    fn should_ignore(&self, path: &Path) -> bool {
        self.is_ignored(path)
    }
}

/// Absolute path with the parent directory resolved, so a file that does
/// not exist yet still compares equal to the paths the watcher reports.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or(absolute),
        _ => absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(root: &Path, content: &str) -> IgnoreRules {
        IgnoreRules::from_content(root, None, content).unwrap()
    }

    #[test]
    fn defaults_cover_vcs_and_editor_noise() {
        let root = Path::new("/work/theme");
        let rules = rules(root, "");

        assert!(rules.is_ignored(&root.join(".DS_Store")));
        assert!(rules.is_ignored(&root.join("css/.DS_Store")));
        assert!(rules.is_ignored(&root.join(".git/HEAD")));
        assert!(rules.is_ignored(&root.join("node_modules/x/index.js")));
        assert!(rules.is_ignored(&root.join("templates/page.html.swp")));
        assert!(rules.is_ignored(&root.join("debug.log")));
        assert!(rules.is_ignored(&root.join("cmsproject.json")));
        assert!(!rules.is_ignored(&root.join("css/main.css")));
    }

    #[test]
    fn file_patterns_use_gitignore_semantics() {
        let root = Path::new("/work/theme");
        let rules = rules(root, "# drafts\nwip/\n*.bak\n!keep.bak\n");

        assert!(rules.is_ignored(&root.join("wip/a.css")));
        assert!(rules.is_ignored(&root.join("old.bak")));
        assert!(!rules.is_ignored(&root.join("keep.bak")));
        assert_eq!(rules.pattern_count(), 3);
    }

    #[test]
    fn paths_outside_root_are_not_matched() {
        let rules = rules(Path::new("/work/theme"), "*.css\n");
        assert!(!rules.is_ignored(Path::new("/elsewhere/a.css")));
        assert!(rules.is_ignored(Path::new("relative/a.css")));
    }

    #[test]
    fn explicit_paths_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let notify = root.join("changes.txt");

        let rules = rules(&root, "").with_path(&notify);
        assert!(rules.is_ignored(&notify));
        assert!(!rules.is_ignored(&root.join("other.txt")));
    }

    #[test]
    fn load_reads_ignore_file_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        assert_eq!(IgnoreRules::load(root, DEFAULT_IGNORE_FILE).unwrap().pattern_count(), 0);

        fs::write(root.join(DEFAULT_IGNORE_FILE), "*.psd\n").unwrap();
        let rules = IgnoreRules::load(root, DEFAULT_IGNORE_FILE).unwrap();
        assert_eq!(rules.pattern_count(), 1);
        assert!(rules.is_ignored(&root.join("art/logo.psd")));
    }

    #[test]
    fn invalid_pattern_reports_line() {
        let err = IgnoreRules::from_content(
            Path::new("/work"),
            Some(Path::new("/work/.cmsignore")),
            "ok.txt\n[\n",
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidIgnorePattern { line: 2, .. }));
    }
}
