//! Command handlers for the cmsync binary

mod project;
mod watch;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use cmsync::config::{find_config, Config};
use cmsync::presentation::{
    is_project_error, is_watch_error, render_project_event, render_watch_event,
};
use cmsync::{ProjectEvent, WatchEvent};

pub use project::cmd_project_watch;
pub use watch::{cmd_watch, WatchArgs};

/// Load the config file, report unknown keys, then apply `CMSYNC_*` overrides
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(std::env::current_dir().ok().as_deref()),
    };

    let config = match path {
        Some(path) => {
            let (config, warnings) = Config::load_with_warnings(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            for warning in warnings {
                let location = match warning.line {
                    Some(line) => format!("{}:{}", warning.file.display(), line),
                    None => warning.file.display().to_string(),
                };
                match warning.suggestion {
                    Some(suggestion) => eprintln!(
                        "Warning: unknown config key '{}' in {} (did you mean '{}'?)",
                        warning.key, location, suggestion
                    ),
                    None => eprintln!(
                        "Warning: unknown config key '{}' in {}",
                        warning.key, location
                    ),
                }
            }
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        None => Config::default(),
    };

    Ok(config.with_env_overrides())
}

/// CLI flag first, then the config file
fn resolve_account(flag: Option<u64>, config: &Config) -> Result<u64> {
    flag.or(config.account.id).context(
        "No account configured. Pass --account, set [account] id in cmsync.toml, or set CMSYNC_ACCOUNT_ID",
    )
}

/// Running flag cleared by Ctrl+C
fn install_ctrlc() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl+C handler")?;

    Ok(running)
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn print_watch_event(json: bool, event: &WatchEvent) {
    if json {
        println!("{}", event.to_json());
        return;
    }
    let rendered = render_watch_event(&timestamp(), event, true);
    if is_watch_error(event) {
        eprint!("{rendered}");
    } else {
        print!("{rendered}");
    }
}

fn print_project_event(json: bool, event: &ProjectEvent) {
    if json {
        println!("{}", event.to_json());
        return;
    }
    let rendered = render_project_event(&timestamp(), event, true);
    if is_project_error(event) {
        eprint!("{rendered}");
    } else {
        print!("{rendered}");
    }
}
