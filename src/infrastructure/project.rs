//! Project configuration (`cmsproject.json`)
//!
//! A project directory is marked by a `cmsproject.json` holding the project
//! name and the source subdirectory whose files make up a build.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SyncError, SyncResult};

pub const PROJECT_CONFIG_FILE: &str = "cmsproject.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    pub src_dir: PathBuf,
}

/// A project configuration and the directory it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub config: ProjectConfig,
    pub dir: PathBuf,
}

impl Project {
    /// Find `cmsproject.json` in `start` or the nearest parent directory
    pub fn locate(start: &Path) -> SyncResult<Self> {
        let start = std::path::absolute(start)?;
        for dir in start.ancestors() {
            let file = dir.join(PROJECT_CONFIG_FILE);
            if file.is_file() {
                return Self::load(&file);
            }
        }
        Err(SyncError::ProjectNotFound {
            file_name: PROJECT_CONFIG_FILE.to_string(),
            dir: start,
        })
    }

    /// Parse a specific project file
    pub fn load(file: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(file)?;
        let config: ProjectConfig =
            serde_json::from_str(&content).map_err(|e| SyncError::InvalidProject {
                file: file.to_path_buf(),
                message: e.to_string(),
            })?;
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self { config, dir })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Absolute source directory of the project
    pub fn src_path(&self) -> PathBuf {
        self.dir.join(&self.config.src_dir)
    }

    /// Check the name is set and the source directory exists inside the project
    pub fn validate(&self) -> SyncResult<()> {
        let invalid = |message: &str| SyncError::InvalidProject {
            file: self.dir.join(PROJECT_CONFIG_FILE),
            message: message.to_string(),
        };

        if self.config.name.trim().is_empty() {
            return Err(invalid("project name must not be empty"));
        }
        if self.config.src_dir.as_os_str().is_empty() {
            return Err(invalid("srcDir must not be empty"));
        }
        if self.config.src_dir.is_absolute() {
            return Err(invalid("srcDir must be relative to the project directory"));
        }

        let src = self.src_path();
        if !src.is_dir() {
            return Err(SyncError::DirectoryNotFound { path: src });
        }
        let project_dir = self.dir.canonicalize()?;
        if !src.canonicalize()?.starts_with(&project_dir) {
            return Err(invalid("srcDir must be inside the project directory"));
        }
        Ok(())
    }
}
