//! Scenario: Batching project edits into builds
//!
//! Journey: A developer runs `cmsync project watch` in a project directory
//! and saves several files in quick succession.
//!
//! Success Criteria:
//! - A burst of saves produces exactly one staged build and one commit
//! - The committed build contains every file saved during the burst
//! - A locked project stops the watch with a build error and no polling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cmsync::application::BuildPhase;
use cmsync::domain::ports::PollPolicy;
use cmsync::error::PROJECT_LOCKED;
use cmsync::infrastructure::{IgnoreRules, MockTransport, Project};
use cmsync::{
    BuildError, BuildId, BuildStatus, FsEvent, ProjectEvent, ProjectWatchOptions,
    ProjectWatchSession, SyncError,
};

use crate::common::*;

const ACCOUNT: u64 = 7;

fn project_workspace() -> Workspace {
    let ws = Workspace::new();
    ws.write(
        "cmsproject.json",
        r#"{ "name": "marketing-site", "srcDir": "src" }"#,
    );
    ws.write("src/app/app.json", "{}");
    ws.write(".cmsignore", "drafts/\n");
    ws
}

fn session_for(
    ws: &Workspace,
    transport: &Arc<MockTransport>,
    quiet: Duration,
) -> ProjectWatchSession {
    let project = Project::locate(&ws.path("src/app")).unwrap();
    project.validate().unwrap();
    let src_dir = project.src_path().canonicalize().unwrap();

    let options = ProjectWatchOptions::new(ACCOUNT, project.name(), &src_dir)
        .with_build_debounce(quiet)
        .with_poll(PollPolicy {
            interval: Duration::from_millis(1),
            max_polls: 20,
        });
    let ignore = IgnoreRules::load(&ws.root, ".cmsignore").unwrap();
    ProjectWatchSession::new(options, transport.clone())
        .unwrap()
        .with_ignore(Arc::new(ignore))
}

/// SCENARIO: five saves within two seconds become one build
#[test]
fn scenario_burst_of_saves_becomes_one_build() {
    let ws = project_workspace();
    let transport = Arc::new(MockTransport::new());
    transport.script_statuses([BuildStatus::Pending, BuildStatus::Success]);
    let quiet = Duration::from_millis(5000);
    let mut session = session_for(&ws, &transport, quiet);
    let log = EventLog::new();
    let start = Instant::now();

    let names = ["a.json", "b.json", "c.json", "d.json", "e.json"];
    for (i, name) in names.iter().enumerate() {
        let file = ws.write(&format!("src/app/{}", name), "{}");
        let now = start + Duration::from_millis(i as u64 * 500);
        session
            .handle_fs_event(&FsEvent::change(&file), now, &log.sink())
            .unwrap();
        session.tick(now, &log.sink()).unwrap();
    }
    // Files under an ignored directory do not join the build
    let draft = ws.write("src/app/drafts/wip.json", "{}");
    session
        .handle_fs_event(&FsEvent::add(&draft), start, &log.sink())
        .unwrap();

    let last = start + Duration::from_millis(2000);
    let committed = session.tick(last + quiet, &log.sink()).unwrap();

    assert_eq!(committed, Some(BuildId(1)));
    assert_eq!(transport.provision_count(), 1);
    assert_eq!(transport.queue_count(), 1);
    assert_eq!(transport.status_count(), 2);

    let mut uploaded: Vec<String> = transport
        .build_uploads()
        .into_iter()
        .map(|(id, path)| {
            assert_eq!(id, BuildId(1));
            path
        })
        .collect();
    uploaded.sort();
    assert_eq!(
        uploaded,
        names
            .iter()
            .map(|n| format!("app/{}", n))
            .collect::<Vec<_>>()
    );

    assert_eq!(session.phase(), BuildPhase::Idle);
    assert!(!session.queue().is_paused());
    assert_eq!(
        log.count(|e| matches!(e, ProjectEvent::BuildSucceeded { .. })),
        1
    );
}

/// SCENARIO: the project is locked when the build is committed
#[test]
fn scenario_locked_project_stops_the_watch() {
    let ws = project_workspace();
    let transport = Arc::new(MockTransport::new());
    transport.fail_queue(PROJECT_LOCKED);
    let session = session_for(&ws, &transport, Duration::from_millis(100));
    let running = Arc::new(AtomicBool::new(true));
    let log = EventLog::new();

    let editor = {
        let file = ws.path("src/app/app.json");
        let running = Arc::clone(&running);
        let transport = Arc::clone(&transport);
        thread::spawn(move || {
            // Let the watcher register before editing
            thread::sleep(Duration::from_millis(300));
            std::fs::write(&file, r#"{"edited":true}"#).unwrap();
            // Stop the loop if the commit never happens
            if !wait_until(Duration::from_secs(10), || transport.queue_count() > 0) {
                running.store(false, Ordering::SeqCst);
            }
        })
    };

    let result = session.run(Arc::clone(&running), log.sink());
    editor.join().unwrap();

    match result {
        Err(SyncError::Build(BuildError::ProjectLocked { project })) => {
            assert_eq!(project, "marketing-site")
        }
        other => panic!("expected a locked project error, got {:?}", other),
    }
    assert_eq!(transport.provision_count(), 1);
    assert_eq!(transport.status_count(), 0);
    assert!(matches!(
        log.all().first(),
        Some(ProjectEvent::WatchStarted { .. })
    ));
}
