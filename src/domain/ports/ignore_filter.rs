//! Ignore Filter Port

use std::path::Path;

/// Predicate deciding which local paths are never synchronized.
///
/// Implementations must not fail; an unreadable rule set is an error at
/// construction time, not at match time.
pub trait IgnoreFilter: Send + Sync {
    fn should_ignore(&self, path: &Path) -> bool;
}

/// Ignores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIgnore;

impl IgnoreFilter for NoIgnore {
    fn should_ignore(&self, _path: &Path) -> bool {
        false
    }
}

impl<F> IgnoreFilter for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn should_ignore(&self, path: &Path) -> bool {
        self(path)
    }
}
