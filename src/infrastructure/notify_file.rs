//! Change notify file
//!
//! Appends one line per finished change so external tools can follow what the
//! watcher did: `<rfc3339 timestamp> <Added|Changed|Removed> <path>`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone)]
pub struct ChangeLog {
    path: PathBuf,
}

impl ChangeLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a line stamped with the current time. Write failures are logged.
    pub fn record(&self, action: &str, changed: &Path) {
        if let Err(e) = self.append(&format_line(Utc::now(), action, changed)) {
            tracing::warn!(
                "Unable to write to notify file {}: {}",
                self.path.display(),
                e
            );
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

fn format_line(at: DateTime<Utc>, action: &str, changed: &Path) -> String {
    format!(
        "{} {} {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        action,
        changed.display()
    )
}
