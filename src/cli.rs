use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use cmsync::UploadMode;

/// cmsync - keep a local directory in sync with a remote CMS
#[derive(Parser, Debug)]
#[command(name = "cmsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print events as NDJSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./cmsync.toml, then the user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch a local directory and mirror changes to a remote destination
    Watch {
        /// Local directory to watch
        src: PathBuf,

        /// Remote destination path
        dest: String,

        /// Delete remote files when they are removed locally
        #[arg(long)]
        remove: bool,

        /// Upload the whole directory before watching
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        initial_upload: bool,

        /// Append one line per finished change to this file
        #[arg(long)]
        notify: Option<PathBuf>,

        /// Publish immediately or upload as draft
        #[arg(long, value_enum, default_value_t = ModeArg::Publish)]
        mode: ModeArg,

        /// Compile fields.js into fields.json before upload
        #[arg(long)]
        process_fields: bool,

        /// Value passed to fields.js as its options argument (repeatable)
        #[arg(long = "options", value_name = "OPTION")]
        options: Vec<String>,

        /// Account id (overrides the config file)
        #[arg(long)]
        account: Option<u64>,
    },

    /// Project commands
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Upload project changes into staged builds and deploy them
    Watch {
        /// Project directory (searched upwards for cmsproject.json)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Account id (overrides the config file)
        #[arg(long)]
        account: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Publish,
    Draft,
}

impl From<ModeArg> for UploadMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Publish => UploadMode::Publish,
            ModeArg::Draft => UploadMode::Draft,
        }
    }
}
