//! Output Rendering
//!
//! Human-readable lines for watch and project events. NDJSON output goes
//! through each event's `to_json()` instead.

use crate::application::project_watch::ProjectEvent;
use crate::application::watch::WatchEvent;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Arrow,
    Watch,
    Remote,
    Trash,
}

impl Icon {
    pub fn render(&self, supports_unicode: bool) -> &'static str {
        match (supports_unicode, self) {
            (true, Icon::Success) => "✓",
            (true, Icon::Error) => "✗",
            (true, Icon::Warning) => "⚠",
            (true, Icon::Progress) => "●",
            (true, Icon::Arrow) => "↳",
            (true, Icon::Watch) => "⟳",
            (true, Icon::Remote) => "📡",
            (true, Icon::Trash) => "🗑",
            (false, Icon::Success) => "[OK]",
            (false, Icon::Error) => "[FAIL]",
            (false, Icon::Warning) => "[WARN]",
            (false, Icon::Progress) => "[..]",
            (false, Icon::Arrow) => "[>]",
            (false, Icon::Watch) => "[~]",
            (false, Icon::Remote) => "[REMOTE]",
            (false, Icon::Trash) => "[DEL]",
        }
    }
}

/// Whether an event belongs on stderr
pub fn is_watch_error(event: &WatchEvent) -> bool {
    matches!(
        event,
        WatchEvent::UploadFailed { .. }
            | WatchEvent::DeleteFailed { .. }
            | WatchEvent::CompileFailed { .. }
            | WatchEvent::Error { .. }
    )
}

pub fn is_project_error(event: &ProjectEvent) -> bool {
    matches!(
        event,
        ProjectEvent::FileUploadFailed { .. }
            | ProjectEvent::BuildFailed { .. }
            | ProjectEvent::Error { .. }
    )
}

pub fn render_watch_event(timestamp: &str, event: &WatchEvent, unicode: bool) -> String {
    let prefix = format!("[{}]", timestamp);
    let icon = |i: Icon| i.render(unicode);

    match event {
        WatchEvent::WatchStarted {
            source,
            dest,
            mode,
            remove,
        } => {
            let remove = if *remove { ", remove enabled" } else { "" };
            format!(
                "{} {} Watching {} -> {} ({}{})\n",
                prefix,
                icon(Icon::Watch),
                source,
                dest,
                mode,
                remove
            )
        }
        WatchEvent::InitialUploadStarted { files } => format!(
            "{} {} Uploading {} files...\n",
            prefix,
            icon(Icon::Progress),
            files
        ),
        WatchEvent::InitialUploadComplete {
            source,
            dest,
            uploaded,
            failed,
        } => {
            if *failed > 0 {
                format!(
                    "{} {} Uploaded {} to {}: {} uploaded, {} failed\n",
                    prefix,
                    icon(Icon::Warning),
                    source,
                    dest,
                    uploaded,
                    failed
                )
            } else {
                format!(
                    "{} {} Uploaded {} to {}: {} files\n",
                    prefix,
                    icon(Icon::Success),
                    source,
                    dest,
                    uploaded
                )
            }
        }
        WatchEvent::WatcherReady { source } => format!(
            "{} {} Watcher ready on {}. Press Ctrl+C to stop\n",
            prefix,
            icon(Icon::Watch),
            source
        ),
        WatchEvent::Uploaded {
            local,
            remote,
            attempts,
        } => {
            let retry = if *attempts > 1 { " (after retry)" } else { "" };
            format!(
                "{} {} Uploaded {} to {}{}\n",
                prefix,
                icon(Icon::Success),
                local,
                remote,
                retry
            )
        }
        WatchEvent::UploadFailed {
            local,
            remote,
            error,
            ..
        } => format!(
            "{} {} Uploading {} to {} failed: {}\n",
            prefix,
            icon(Icon::Error),
            local,
            remote,
            error
        ),
        WatchEvent::Deleted { remote, .. } => {
            format!("{} {} Deleted {}\n", prefix, icon(Icon::Trash), remote)
        }
        WatchEvent::DeleteFailed { remote, error, .. } => format!(
            "{} {} Deleting {} failed: {}\n",
            prefix,
            icon(Icon::Error),
            remote,
            error
        ),
        WatchEvent::CompileFailed { local, error, .. } => format!(
            "{} {} Compiling {} failed: {}\n",
            prefix,
            icon(Icon::Error),
            local,
            error
        ),
        WatchEvent::Preview { url } => {
            format!("{} {} Preview: {}\n", prefix, icon(Icon::Arrow), url)
        }
        WatchEvent::Error { message } => {
            format!("{} {} Error: {}\n", prefix, icon(Icon::Error), message)
        }
        WatchEvent::Shutdown => format!("{} Stopped watching\n", prefix),
    }
}

pub fn render_project_event(timestamp: &str, event: &ProjectEvent, unicode: bool) -> String {
    let prefix = format!("[{}]", timestamp);
    let icon = |i: Icon| i.render(unicode);

    match event {
        ProjectEvent::WatchStarted { project, src_dir } => format!(
            "{} {} Watching project {} ({})\n",
            prefix,
            icon(Icon::Watch),
            project,
            src_dir
        ),
        ProjectEvent::WatcherReady { .. } => format!(
            "{} {} Watcher ready. Press Ctrl+C to stop\n",
            prefix,
            icon(Icon::Watch)
        ),
        ProjectEvent::BuildProvisioned { build_id } => format!(
            "{} {} Created build {}\n",
            prefix,
            icon(Icon::Remote),
            build_id
        ),
        ProjectEvent::FileUploaded {
            build_id,
            local,
            remote,
        } => format!(
            "{} {} Uploaded {} to {} in build {}\n",
            prefix,
            icon(Icon::Success),
            local,
            remote,
            build_id
        ),
        ProjectEvent::FileUploadFailed {
            build_id,
            local,
            error,
            ..
        } => format!(
            "{} {} Uploading {} into build {} failed: {}\n",
            prefix,
            icon(Icon::Error),
            local,
            build_id,
            error
        ),
        ProjectEvent::BuildQueued { build_id } => format!(
            "{} {} Building {}...\n",
            prefix,
            icon(Icon::Progress),
            build_id
        ),
        ProjectEvent::BuildSucceeded { build_id } => format!(
            "{} {} Build {} succeeded, resuming watcher\n",
            prefix,
            icon(Icon::Success),
            build_id
        ),
        ProjectEvent::BuildFailed { build_id, status } => format!(
            "{} {} Build {} finished with status {}\n",
            prefix,
            icon(Icon::Error),
            build_id,
            status
        ),
        ProjectEvent::Error { message } => {
            format!("{} {} Error: {}\n", prefix, icon(Icon::Error), message)
        }
        ProjectEvent::Shutdown => format!("{} Stopped watching\n", prefix),
    }
}
