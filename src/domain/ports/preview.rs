//! Preview URL Port

use std::path::Path;

/// Resolves a browser URL where the effect of a change can be previewed
pub trait PreviewUrlResolver: Send + Sync {
    fn resolve(&self, path: &Path, account_id: u64) -> Option<String>;
}

/// Never has a preview
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreview;

impl PreviewUrlResolver for NoPreview {
    fn resolve(&self, _path: &Path, _account_id: u64) -> Option<String> {
        None
    }
}
