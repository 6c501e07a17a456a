//! Theme preview URLs
//!
//! A file inside a theme (a directory holding `theme.json`) can be previewed
//! in the theme previewer of the web app.

use std::path::Path;

use crate::domain::ports::PreviewUrlResolver;
use crate::domain::value_objects::{to_remote_path, WatchRoot};

use super::transport::encode_segment;

const THEME_MANIFEST: &str = "theme.json";

#[derive(Debug, Clone)]
pub struct ThemePreviewResolver {
    root: WatchRoot,
    app_base: String,
}

impl ThemePreviewResolver {
    pub fn new(root: WatchRoot, app_base: &str) -> Self {
        Self {
            root,
            app_base: app_base.trim_end_matches('/').to_string(),
        }
    }

    /// Nearest directory at or above `path` (within the watch root) that
    /// contains a theme manifest
    fn theme_dir<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.ancestors()
            .skip(1)
            .take_while(|dir| dir.starts_with(self.root.local_src()))
            .find(|dir| dir.join(THEME_MANIFEST).is_file())
    }
}

impl PreviewUrlResolver for ThemePreviewResolver {
    fn resolve(&self, path: &Path, account_id: u64) -> Option<String> {
        let theme_dir = self.theme_dir(path)?;
        let remote = to_remote_path(theme_dir, &self.root).ok()?;
        let theme = remote.trim_matches('/');
        if theme.is_empty() {
            return None;
        }
        Some(format!(
            "{}/theme-previewer/{}/edit/{}",
            self.app_base,
            account_id,
            encode_segment(theme)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn url_for_file_inside_theme() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("theme.json"), "{}").unwrap();
        let file = root.join("templates/home.html");
        fs::write(&file, "").unwrap();

        let resolver = ThemePreviewResolver::new(
            WatchRoot::new(root, "my theme"),
            "https://app.example.com/",
        );
        assert_eq!(
            resolver.resolve(&file, 42).as_deref(),
            Some("https://app.example.com/theme-previewer/42/edit/my%20theme")
        );
    }

    #[test]
    fn nested_theme_uses_its_own_remote_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let theme = root.join("themes/blog");
        fs::create_dir_all(&theme).unwrap();
        fs::write(theme.join("theme.json"), "{}").unwrap();
        let file = theme.join("css/main.css");

        let resolver =
            ThemePreviewResolver::new(WatchRoot::new(root, "/site"), "https://app.example.com");
        assert_eq!(
            resolver.resolve(&file, 7).as_deref(),
            Some("https://app.example.com/theme-previewer/7/edit/site%2Fthemes%2Fblog")
        );
    }

    #[test]
    fn no_theme_manifest_means_no_preview() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.css");
        let resolver = ThemePreviewResolver::new(
            WatchRoot::new(dir.path(), "/site"),
            "https://app.example.com",
        );
        assert_eq!(resolver.resolve(&file, 1), None);
    }
}
