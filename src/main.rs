//! cmsync CLI
//!
//! Usage: cmsync <COMMAND>
//!
//! Commands:
//!   watch          Mirror a local directory onto a remote destination
//!   project watch  Upload project changes into staged builds and deploy them

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ProjectCommands};
use commands::{cmd_project_watch, cmd_watch, load_config, WatchArgs};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Watch {
            src,
            dest,
            remove,
            initial_upload,
            notify,
            mode,
            process_fields,
            options,
            account,
        } => cmd_watch(
            WatchArgs {
                src,
                dest,
                remove,
                initial_upload,
                notify,
                mode: mode.into(),
                process_fields,
                fields_options: options,
                account,
            },
            &config,
            cli.json,
        )
        .map(|()| ExitCode::SUCCESS),
        Commands::Project {
            command: ProjectCommands::Watch { path, account },
        } => cmd_project_watch(&path, account, &config, cli.json),
    }
}

/// `RUST_LOG` wins; otherwise `-v` selects debug and `-vv` trace
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "cmsync=debug",
        _ => "cmsync=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
