//! Scenario: Mirroring a theme directory
//!
//! Journey: A developer runs `cmsync watch ./src /site/theme --remove` and
//! edits files while the watch runs.
//!
//! Success Criteria:
//! - Every add/change becomes one upload to the mapped remote path
//! - Deletes are mirrored only with remove enabled
//! - A flaky upload is retried exactly once
//! - Ignored and unsupported files never reach the backend

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cmsync::infrastructure::{IgnoreRules, MockTransport, ThemePreviewResolver, TransportCall};
use cmsync::{FsEvent, UploadMode, WatchEvent, WatchOptions, WatchRoot, WatchSession};

use crate::common::*;

const ACCOUNT: u64 = 42;

fn session_for(ws: &Workspace, transport: &Arc<MockTransport>, remove: bool) -> WatchSession {
    let root = WatchRoot::new(ws.path("src"), "/site/theme")
        .with_mode(UploadMode::Publish)
        .with_remove(remove);
    let options = WatchOptions::new(root, ACCOUNT).with_initial_upload(false);
    WatchSession::new(options, transport.clone()).unwrap()
}

/// SCENARIO: add, delete, and a flaky upload
#[test]
fn scenario_add_delete_and_retry() {
    let ws = Workspace::new();
    ws.write("src/.keep.txt", "");
    let transport = Arc::new(MockTransport::new());
    let mut session = session_for(&ws, &transport, true);
    let log = EventLog::new();

    // Create a.css
    let a = ws.write("src/a.css", "body {}");
    let task = session.handle_fs_event(&FsEvent::add(&a)).unwrap();
    assert_eq!(task.remote_path, "/site/theme/a.css");
    session.wait_for_tasks(&log.sink());
    assert_eq!(transport.uploads(), vec!["/site/theme/a.css".to_string()]);

    // Delete a.css
    ws.remove("src/a.css");
    session.handle_fs_event(&FsEvent::unlink(&a)).unwrap();
    session.wait_for_tasks(&log.sink());
    assert_eq!(transport.deletes(), vec!["/site/theme/a.css".to_string()]);

    // b.js fails once, then succeeds
    transport.fail_upload("/site/theme/b.js", 1);
    let b = ws.write("src/b.js", "export {}");
    session.handle_fs_event(&FsEvent::add(&b)).unwrap();
    session.wait_for_tasks(&log.sink());

    let b_calls = transport
        .calls()
        .into_iter()
        .filter(|c| matches!(c, TransportCall::Upload { remote, .. } if remote == "/site/theme/b.js"))
        .count();
    assert_eq!(b_calls, 2);
    assert!(log.all().contains(&WatchEvent::Uploaded {
        local: b.display().to_string(),
        remote: "/site/theme/b.js".to_string(),
        attempts: 2,
    }));
    assert_eq!(
        log.count(|e| matches!(e, WatchEvent::UploadFailed { .. })),
        0
    );
}

/// SCENARIO: removals are not mirrored without --remove
#[test]
fn scenario_remove_disabled_keeps_remote_files() {
    let ws = Workspace::new();
    let a = ws.write("src/a.css", "");
    let transport = Arc::new(MockTransport::new());
    let mut session = session_for(&ws, &transport, false);

    ws.remove("src/a.css");
    assert!(session.handle_fs_event(&FsEvent::unlink(&a)).is_none());
    assert!(session
        .handle_fs_event(&FsEvent::unlink_dir(ws.path("src/old")))
        .is_none());
    assert!(transport.calls().is_empty());
}

/// SCENARIO: a theme with an ignore file, initial upload, then a preview URL
#[test]
fn scenario_theme_initial_upload_and_preview() {
    let ws = Workspace::new();
    ws.write("src/theme.json", "{}");
    ws.write("src/css/main.css", "body {}");
    ws.write("src/drafts/wip.css", "");
    ws.write("src/logo.psd", "");
    ws.write("src/.cmsignore", "drafts/\n");

    let transport = Arc::new(MockTransport::new());
    let src = ws.path("src");
    let root = WatchRoot::new(&src, "/site/theme");
    let options = WatchOptions::new(root, ACCOUNT).with_preview_debounce(Duration::from_millis(50));
    let ignore = IgnoreRules::load(&src, ".cmsignore").unwrap();
    let session = WatchSession::new(options, transport.clone())
        .unwrap()
        .with_ignore(Arc::new(ignore));
    let resolver = ThemePreviewResolver::new(session.root().clone(), "https://app.example.com");
    let mut session = session.with_preview(Arc::new(resolver));
    let log = EventLog::new();

    let summary = session.initial_upload(&log.sink()).unwrap();
    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.failed, 0);
    let mut uploads = transport.uploads();
    uploads.sort();
    assert_eq!(
        uploads,
        vec![
            "/site/theme/css/main.css".to_string(),
            "/site/theme/theme.json".to_string(),
        ]
    );

    // Initial uploads never produce a preview
    session.tick(Instant::now() + Duration::from_secs(1), &log.sink());
    assert_eq!(log.count(|e| matches!(e, WatchEvent::Preview { .. })), 0);

    // An edit does, once the window is quiet
    let main = ws.write("src/css/main.css", "body { color: red }");
    session.handle_fs_event(&FsEvent::change(&main)).unwrap();
    session.wait_for_tasks(&log.sink());
    session.tick(Instant::now() + Duration::from_millis(100), &log.sink());

    assert!(log.all().contains(&WatchEvent::Preview {
        url: "https://app.example.com/theme-previewer/42/edit/site%2Ftheme".to_string()
    }));
}

/// SCENARIO: the full control loop picks up a real filesystem change
#[test]
fn scenario_live_watch_uploads_new_file() {
    let ws = Workspace::new();
    ws.write("src/existing.css", "");
    let transport = Arc::new(MockTransport::new());
    let root = WatchRoot::new(ws.path("src"), "/site/theme");
    let session = WatchSession::new(WatchOptions::new(root, ACCOUNT), transport.clone()).unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let log = EventLog::new();

    let editor = {
        let running = Arc::clone(&running);
        let transport = Arc::clone(&transport);
        let new_file = ws.path("src/new.css");
        thread::spawn(move || {
            let timeout = Duration::from_secs(10);
            wait_until(timeout, || transport.uploads().len() == 1);
            std::fs::write(&new_file, "a {}").unwrap();
            wait_until(timeout, || {
                transport
                    .uploads()
                    .contains(&"/site/theme/new.css".to_string())
            });
            running.store(false, Ordering::SeqCst);
        })
    };

    session.run(running, log.sink()).unwrap();
    editor.join().unwrap();

    assert!(transport
        .uploads()
        .contains(&"/site/theme/new.css".to_string()));
    let events = log.all();
    assert!(matches!(events.first(), Some(WatchEvent::WatchStarted { .. })));
    assert!(events.contains(&WatchEvent::InitialUploadComplete {
        source: ws.path("src").display().to_string(),
        dest: "/site/theme".to_string(),
        uploaded: 1,
        failed: 0,
    }));
    assert_eq!(events.last(), Some(&WatchEvent::Shutdown));
}

/// SCENARIO: a file edited while the initial upload is still running is synced
#[test]
fn scenario_edit_during_initial_upload_is_not_lost() {
    let ws = Workspace::new();
    for i in 0..20 {
        ws.write(&format!("src/file{:02}.css", i), "");
    }
    let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(100)));
    let root = WatchRoot::new(ws.path("src"), "/site/theme");
    let options = WatchOptions::new(root, ACCOUNT).with_concurrency(1);
    let session = WatchSession::new(options, transport.clone()).unwrap();
    let running = Arc::new(AtomicBool::new(true));
    let log = EventLog::new();

    let editor = {
        let running = Arc::clone(&running);
        let transport = Arc::clone(&transport);
        let edited = ws.path("src/edited.css");
        thread::spawn(move || {
            wait_until(Duration::from_secs(10), || transport.uploads().len() >= 2);
            std::fs::write(&edited, "a { color: red }").unwrap();
            wait_until(Duration::from_secs(15), || {
                transport
                    .uploads()
                    .contains(&"/site/theme/edited.css".to_string())
            });
            running.store(false, Ordering::SeqCst);
        })
    };

    session.run(running, log.sink()).unwrap();
    editor.join().unwrap();

    let uploads = transport.uploads();
    assert!(uploads.contains(&"/site/theme/edited.css".to_string()));
    assert!(uploads.len() >= 21);

    let events = log.all();
    let complete = events
        .iter()
        .position(|e| matches!(e, WatchEvent::InitialUploadComplete { .. }))
        .unwrap();
    let ready = events
        .iter()
        .position(|e| matches!(e, WatchEvent::WatcherReady { .. }))
        .unwrap();
    assert!(complete < ready);
}
