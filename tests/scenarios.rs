//! Scenario tests for cmsync.
//!
//! Scenarios drive a whole session through its public API with an in-memory
//! transport, the way a user's edits would.
//!
//! Run with: cargo test --test scenarios

mod common;

#[path = "scenarios/watch_sync.rs"]
mod watch_sync;

#[path = "scenarios/project_build.rs"]
mod project_build;
