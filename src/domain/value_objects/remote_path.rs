//! Local-to-remote path mapping
//!
//! Pure string/path manipulation. Never consults the filesystem, so it works
//! for files that have already been deleted locally.

use std::path::{Component, Path};

use thiserror::Error;

use super::WatchRoot;

/// A local path could not be mapped onto the remote tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathMapError {
    #[error("'{path}' is not inside '{root}'")]
    OutsideRoot { path: String, root: String },
}

/// Map a local path under `root.local_src()` onto `root.remote_dest()`.
///
/// The result always uses forward slashes. Mapping an already-mapped remote
/// path is not meaningful; mapping the same local path twice yields the same
/// result.
pub fn to_remote_path(local_path: &Path, root: &WatchRoot) -> Result<String, PathMapError> {
    let relative = relative_segments(local_path, root.local_src())?;
    Ok(join_remote(root.remote_dest(), &relative))
}

/// Path of a project file relative to the project's source directory.
pub fn to_build_path(local_path: &Path, src_dir: &Path) -> Result<String, PathMapError> {
    Ok(relative_segments(local_path, src_dir)?.join("/"))
}

fn relative_segments(local_path: &Path, base: &Path) -> Result<Vec<String>, PathMapError> {
    let outside = || PathMapError::OutsideRoot {
        path: local_path.display().to_string(),
        root: base.display().to_string(),
    };

    let local = normal_components(local_path);
    let base = normal_components(base);
    if local.len() < base.len() || local[..base.len()] != base[..] {
        return Err(outside());
    }
    Ok(local[base.len()..].to_vec())
}

/// Lexical components with `.` removed and `..` resolved where possible.
/// Windows separators inside a component are split as well.
fn normal_components(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(parts.last(), Some(last) if last != "..") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::RootDir => parts.push("/".to_string()),
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::Normal(segment) => {
                for piece in segment.to_string_lossy().split('\\') {
                    if !piece.is_empty() {
                        parts.push(piece.to_string());
                    }
                }
            }
        }
    }
    parts
}

fn join_remote(dest: &str, relative: &[String]) -> String {
    let dest = dest.replace('\\', "/");
    let mut segments: Vec<&str> = dest.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
    for segment in relative {
        segments.push(segment.as_str());
    }
    let joined = segments.join("/");
    if dest.starts_with('/') {
        format!("/{}", joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn root() -> WatchRoot {
        WatchRoot::new("./src", "/site/theme")
    }

    #[test]
    fn maps_file_under_root() {
        let remote = to_remote_path(Path::new("./src/css/a.css"), &root()).unwrap();
        assert_eq!(remote, "/site/theme/css/a.css");
    }

    #[test]
    fn maps_without_leading_dot() {
        let remote = to_remote_path(Path::new("src/a.css"), &root()).unwrap();
        assert_eq!(remote, "/site/theme/a.css");
    }

    #[test]
    fn maps_root_itself_to_dest() {
        let remote = to_remote_path(Path::new("./src"), &root()).unwrap();
        assert_eq!(remote, "/site/theme");
    }

    #[test]
    fn relative_dest_stays_relative() {
        let root = WatchRoot::new("/home/me/theme", "my-theme/");
        let remote = to_remote_path(Path::new("/home/me/theme/templates/x.html"), &root).unwrap();
        assert_eq!(remote, "my-theme/templates/x.html");
    }

    #[test]
    fn backslashes_become_forward_slashes() {
        let root = WatchRoot::new("/work", "remote\\dir");
        let remote = to_remote_path(&PathBuf::from("/work/a\\b.css"), &root).unwrap();
        assert_eq!(remote, "remote/dir/a/b.css");
    }

    #[test]
    fn sibling_with_shared_prefix_is_outside() {
        let err = to_remote_path(Path::new("./src-old/a.css"), &root()).unwrap_err();
        assert!(matches!(err, PathMapError::OutsideRoot { .. }));
    }

    #[test]
    fn build_path_is_relative_to_src_dir() {
        let path = to_build_path(
            Path::new("/proj/src/app/app.json"),
            Path::new("/proj/src"),
        )
        .unwrap();
        assert_eq!(path, "app/app.json");
    }
}
