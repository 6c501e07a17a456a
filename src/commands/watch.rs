use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use cmsync::config::Config;
use cmsync::infrastructure::{FieldsJsCompiler, HttpTransport, IgnoreRules, ThemePreviewResolver};
use cmsync::{UploadMode, WatchOptions, WatchRoot, WatchSession};

use super::{install_ctrlc, print_watch_event, resolve_account};

/// Arguments of `cmsync watch`
#[derive(Debug, Clone)]
pub struct WatchArgs {
    pub src: PathBuf,
    pub dest: String,
    pub remove: bool,
    pub initial_upload: bool,
    pub notify: Option<PathBuf>,
    pub mode: UploadMode,
    pub process_fields: bool,
    pub fields_options: Vec<String>,
    pub account: Option<u64>,
}

pub fn cmd_watch(args: WatchArgs, config: &Config, json: bool) -> Result<()> {
    let src = args
        .src
        .canonicalize()
        .with_context(|| format!("Source directory {} not found", args.src.display()))?;
    if !src.is_dir() {
        bail!("{} is not a directory", src.display());
    }
    let account_id = resolve_account(args.account, config)?;

    let mut ignore = IgnoreRules::load(&src, &config.watch.ignore_file)?;
    if let Some(notify) = &args.notify {
        ignore = ignore.with_path(notify);
    }
    tracing::debug!(
        "Loaded {} ignore patterns from {}",
        ignore.pattern_count(),
        config.watch.ignore_file
    );

    let root = WatchRoot::new(&src, args.dest)
        .with_mode(args.mode)
        .with_remove(args.remove);
    let options = WatchOptions::new(root, account_id)
        .with_initial_upload(args.initial_upload)
        .with_process_fields(args.process_fields)
        .with_notify_file(args.notify)
        .with_concurrency(config.watch.concurrency)
        .with_preview_debounce(config.preview_debounce())
        .with_allowed_extensions(config.allowed_extensions());

    let transport = HttpTransport::new(&config.account.api_base, config.account.access_token.clone())?;
    let mut session =
        WatchSession::new(options, Arc::new(transport))?.with_ignore(Arc::new(ignore));
    if args.process_fields {
        let compiler = FieldsJsCompiler::new(&src).with_options(args.fields_options);
        session = session.with_compiler(Arc::new(compiler));
    }
    let preview = ThemePreviewResolver::new(session.root().clone(), &config.account.app_base);
    let session = session.with_preview(Arc::new(preview));

    let running = install_ctrlc()?;
    session.run(running, |event| print_watch_event(json, &event))?;
    Ok(())
}
