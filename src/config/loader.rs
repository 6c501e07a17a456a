//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};

use super::types::Config;

/// Project-local configuration file name
pub const CONFIG_FILE: &str = "cmsync.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> SyncResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| SyncError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Candidate config files, most specific first
pub fn config_candidates(working_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = working_dir {
        candidates.push(dir.join(CONFIG_FILE));
    }
    if let Some(user_dir) = dirs::config_dir() {
        candidates.push(user_dir.join("cmsync").join("config.toml"));
    }
    candidates
}

/// First candidate config file that exists
pub fn find_config(working_dir: Option<&Path>) -> Option<PathBuf> {
    config_candidates(working_dir)
        .into_iter()
        .find(|p| p.is_file())
}

/// Apply environment variable overrides (CMSYNC_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    // CMSYNC_ACCOUNT_ID
    if let Ok(id) = std::env::var("CMSYNC_ACCOUNT_ID") {
        match id.trim().parse::<u64>() {
            Ok(id) => config.account.id = Some(id),
            Err(_) => tracing::warn!("CMSYNC_ACCOUNT_ID is not a number: {}", id),
        }
    }

    // CMSYNC_ACCESS_TOKEN
    if let Ok(token) = std::env::var("CMSYNC_ACCESS_TOKEN") {
        if !token.trim().is_empty() {
            config.account.access_token = Some(token.trim().to_string());
        }
    }

    // CMSYNC_API_BASE
    if let Ok(base) = std::env::var("CMSYNC_API_BASE") {
        if !base.trim().is_empty() {
            config.account.api_base = base.trim().to_string();
        }
    }

    // CMSYNC_CONCURRENCY
    if let Ok(val) = std::env::var("CMSYNC_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(n) if n > 0 => config.watch.concurrency = n,
            _ => tracing::warn!("CMSYNC_CONCURRENCY must be a positive number: {}", val),
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "account",
        "id",
        "api_base",
        "app_base",
        "access_token",
        "watch",
        "concurrency",
        "preview_debounce_ms",
        "allowed_extensions",
        "ignore_file",
        "project",
        "build_debounce_ms",
        "poll_interval_ms",
        "max_polls",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
