use crate::models::PathOverrides;
use camino::Utf8PathBuf;
use clap::Parser;

/// Command line arguments.
///
/// clap's built-in help and version flags are disabled: `-h/--help` takes an
/// optional category and is rendered by [`crate::help`].
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "rotabackup", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Sources list
    #[arg(short = 'c', long = "configuration", value_name = "FILE")]
    pub configuration: Option<Utf8PathBuf>,

    /// Destinations list
    #[arg(short = 'r', long = "rotations", value_name = "FILE")]
    pub rotations: Option<Utf8PathBuf>,

    /// File receiving a copy of the sync engine's error output
    #[arg(short = 'e', long = "errorlog", value_name = "FILE")]
    pub errorlog: Option<Utf8PathBuf>,

    /// Show help, optionally for a category
    #[arg(
        short = 'h',
        long = "help",
        value_name = "CATEGORY",
        num_args = 0..=1,
        default_missing_value = "none"
    )]
    pub help: Option<String>,

    /// Debug logging, mirrored to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> PathOverrides {
        PathOverrides {
            configuration: self.configuration.clone(),
            rotations: self.rotations.clone(),
            errorlog: self.errorlog.clone(),
        }
    }
}
