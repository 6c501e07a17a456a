use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;

use cmsync::config::Config;
use cmsync::infrastructure::{HttpTransport, IgnoreRules, Project};
use cmsync::{
    BuildError, ProjectEvent, ProjectWatchOptions, ProjectWatchSession, SyncError, SyncResult,
};

use super::{install_ctrlc, print_project_event, resolve_account};

pub fn cmd_project_watch(
    path: &Path,
    account: Option<u64>,
    config: &Config,
    json: bool,
) -> Result<ExitCode> {
    let project = Project::locate(path)?;
    project.validate()?;
    let account_id = resolve_account(account, config)?;

    let project_dir = project.dir.canonicalize()?;
    let src_dir = project.src_path().canonicalize()?;
    let ignore = IgnoreRules::load(&project_dir, &config.watch.ignore_file)?;

    let options = ProjectWatchOptions::new(account_id, project.name(), &src_dir)
        .with_concurrency(config.watch.concurrency)
        .with_build_debounce(config.build_debounce())
        .with_poll(config.poll_policy())
        .with_allowed_extensions(config.allowed_extensions());

    let transport = HttpTransport::new(&config.account.api_base, config.account.access_token.clone())?;
    let session =
        ProjectWatchSession::new(options, Arc::new(transport))?.with_ignore(Arc::new(ignore));

    let running = install_ctrlc()?;
    let result = session.run(running, |event| print_project_event(json, &event));

    match build_failure(result)? {
        Some(e) => {
            print_project_event(
                json,
                &ProjectEvent::Error {
                    message: e.to_string(),
                },
            );
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

/// A build failure is reported as an event and ends the process quietly with
/// a failing status; anything else propagates.
fn build_failure(result: SyncResult<()>) -> Result<Option<BuildError>> {
    match result {
        Ok(()) => Ok(None),
        Err(SyncError::Build(e)) => Ok(Some(e)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failure_is_reported_once() {
        let locked = BuildError::ProjectLocked {
            project: "site".to_string(),
        };
        let failure = build_failure(Err(SyncError::Build(locked.clone()))).unwrap();
        assert_eq!(failure, Some(locked));
    }

    #[test]
    fn test_clean_shutdown_has_no_failure() {
        assert_eq!(build_failure(Ok(())).unwrap(), None);
    }

    #[test]
    fn test_other_errors_propagate() {
        let err = build_failure(Err(SyncError::DirectoryNotFound {
            path: "missing".into(),
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "directory not found: missing");
    }
}
