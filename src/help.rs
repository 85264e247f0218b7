// Help text
//
// Rendered to strings so callers decide where it goes.

use crate::{APP_NAME, VERSION};
use std::str::FromStr;

const CATEGORY_CONFIGURATION: &str = "\
CONFIGURATION FILE
==================
The configuration file is a text file that contains the sources to back up.
Each line of the file must contain the path of a source to back up.
The sources can be files or directories.
The configuration file must have at least one line with a source.
The default configuration file is ~/.config/rotabackup/configuration.

Example:
/home/user/Documents/
/home/user/Pictures/
/home/user/Downloads/
/home/user/.bash_history
";

const CATEGORY_ROTATIONS: &str = "\
ROTATIONS FILE
==============
The rotations file is a text file that contains the destinations for the backup.
Each line of the file must contain the path of a destination.
The destinations must be directories.
The rotations file must have at least one line with a destination.
If there's more than one destination, they are rotated after each successful backup.
The default rotations file is ~/.config/rotabackup/rotations.

Example:
/run/media/user/backup_drive1
/run/media/user/backup_drive2
/run/media/user/backup_drive3
/run/media/user/backup_drive4
";

/// Topics accepted by `--help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpCategory {
    /// Plain `--help`
    Basic,
    /// List of the other categories
    Categories,
    Configuration,
    Rotations,
}

impl FromStr for HelpCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(HelpCategory::Basic),
            "category" | "categories" => Ok(HelpCategory::Categories),
            "configuration" => Ok(HelpCategory::Configuration),
            "rotations" => Ok(HelpCategory::Rotations),
            other => Err(other.to_string()),
        }
    }
}

fn title() -> String {
    format!("{}, v{}\n\n", APP_NAME, VERSION)
}

fn usage() -> String {
    let mut out = String::new();
    out.push_str(&format!("Usage: {} [options...]\n", APP_NAME));
    out.push_str("   -c, --configuration <configuration file> Configuration file\n");
    out.push_str("   -r, --rotations <rotations file>         Rotations file\n");
    out.push_str("   -e, --errorlog <sync error log file>     Sync error log file\n");
    out.push_str("   -v, --verbose                            Debug logging on stderr\n");
    out.push_str("   -h, --help <category>                    Get full help\n");
    out
}

/// Text for a help category.
pub fn render(category: HelpCategory) -> String {
    let mut out = title();

    match category {
        HelpCategory::Basic => {
            out.push_str(&usage());
            out.push('\n');
            out.push_str("This is not the full help, use \"--help category\" to get a list of\n");
            out.push_str("all categories.\n");
        }
        HelpCategory::Categories => {
            out.push_str(" configuration  Get configuration file help\n");
            out.push_str(" rotations      Get rotations file help\n");
        }
        HelpCategory::Configuration => out.push_str(CATEGORY_CONFIGURATION),
        HelpCategory::Rotations => out.push_str(CATEGORY_ROTATIONS),
    }

    out
}

/// Help for a raw `--help` argument; `Err` carries the text for an unknown category.
pub fn category_help(raw: &str) -> Result<String, String> {
    match raw.parse::<HelpCategory>() {
        Ok(category) => Ok(render(category)),
        Err(unknown) => {
            tracing::debug!("Unknown help category: {}", unknown);
            Err(format!("{} Invalid help category\n", title()))
        }
    }
}

/// Title, every error message, then usage.
pub fn with_errors<S: AsRef<str>>(errors: &[S]) -> String {
    let mut out = title();
    for error in errors {
        out.push_str(error.as_ref());
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&usage());
    out
}
