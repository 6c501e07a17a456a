//! Asset Compiler Port
//!
//! Some source assets are not uploaded as-is: they are compiled into an
//! artifact in isolated scratch space, the artifact is uploaded, and the
//! scratch space is removed when the artifact is dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::CompileError;

/// A compiled artifact and the scratch directory that holds it.
///
/// Dropping the artifact removes the scratch directory.
#[derive(Debug)]
pub struct CompiledArtifact {
    path: PathBuf,
    scratch: Option<TempDir>,
}

impl CompiledArtifact {
    /// An artifact living inside `scratch`
    pub fn in_scratch(path: PathBuf, scratch: TempDir) -> Self {
        Self {
            path,
            scratch: Some(scratch),
        }
    }

    /// An artifact that needs no cleanup
    pub fn in_place(path: PathBuf) -> Self {
        Self {
            path,
            scratch: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|d| d.path())
    }
}

/// Compiles special source assets into deployable artifacts
pub trait AssetCompiler: Send + Sync {
    /// Whether `path` is a source this compiler handles
    fn is_compilable(&self, path: &Path) -> bool;

    /// Remote file name of the artifact produced for `path`
    fn artifact_name(&self, path: &Path) -> String;

    fn compile(&self, path: &Path) -> Result<CompiledArtifact, CompileError>;
}

/// Compiles nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompiler;

impl AssetCompiler for NoCompiler {
    fn is_compilable(&self, _path: &Path) -> bool {
        false
    }

    fn artifact_name(&self, path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn compile(&self, path: &Path) -> Result<CompiledArtifact, CompileError> {
        Ok(CompiledArtifact::in_place(path.to_path_buf()))
    }
}
