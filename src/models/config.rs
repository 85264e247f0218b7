use camino::{Utf8Path, Utf8PathBuf};

/// Per-user configuration directory, relative to the home directory.
pub const CONFIG_DIR: &str = ".config/rotabackup";

/// Default name of the sources list inside the configuration directory.
pub const SOURCES_FILE: &str = "configuration";

/// Default name of the destinations list inside the configuration directory.
pub const ROTATIONS_FILE: &str = "rotations";

/// Directory (inside the configuration directory) for diagnostic logs.
pub const LOG_DIR: &str = "logs";

/// Sync engine looked up on the search path.
pub const DEFAULT_SYNC_TOOL: &str = "rsync";

/// Archive mode plus deletion of extraneous files at the destination.
pub const DEFAULT_SYNC_ARGS: &[&str] = &["-av", "--delete"];

/// Paths supplied on the command line, each of which replaces a default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    pub configuration: Option<Utf8PathBuf>,
    pub rotations: Option<Utf8PathBuf>,
    pub errorlog: Option<Utf8PathBuf>,
}

/// Fully resolved settings for a single backup run.
///
/// Built once by [`RunConfig::resolve`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Sources list (one path per line)
    pub configuration: Utf8PathBuf,

    /// Destinations list, head is the current destination
    pub rotations: Utf8PathBuf,

    /// Optional file receiving a copy of the sync tool's stderr
    pub errorlog: Option<Utf8PathBuf>,

    /// Directory for rolling diagnostic logs
    pub log_dir: Utf8PathBuf,

    /// Executable name resolved on the search path
    pub sync_tool: String,

    /// Flags placed before the source and destination arguments
    pub sync_args: Vec<String>,
}

impl RunConfig {
    /// Configuration directory for the given home directory.
    pub fn config_dir(home: &Utf8Path) -> Utf8PathBuf {
        home.join(CONFIG_DIR)
    }

    /// Resolve every path, falling back to `<home>/.config/rotabackup/`.
    ///
    /// The home directory is passed in rather than looked up so that
    /// resolution stays deterministic.
    pub fn resolve(home: &Utf8Path, overrides: PathOverrides) -> Self {
        let config_dir = Self::config_dir(home);

        Self {
            configuration: overrides
                .configuration
                .unwrap_or_else(|| config_dir.join(SOURCES_FILE)),
            rotations: overrides
                .rotations
                .unwrap_or_else(|| config_dir.join(ROTATIONS_FILE)),
            errorlog: overrides.errorlog,
            log_dir: config_dir.join(LOG_DIR),
            sync_tool: DEFAULT_SYNC_TOOL.to_string(),
            sync_args: DEFAULT_SYNC_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the sync engine and its base flags.
    pub fn with_sync_tool<I, S>(mut self, tool: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sync_tool = tool.into();
        self.sync_args = args.into_iter().map(Into::into).collect();
        self
    }
}
