//! Presentation Layer
//!
//! Renders session events for humans. The binary chooses between these text
//! lines and NDJSON (`--json`).

pub mod output;

pub use output::{
    is_project_error, is_watch_error, render_project_event, render_watch_event, Icon,
    OutputFormat,
};
