//! Integration tests for BackupRunner
//!
//! These tests drive complete runs with `sh -c <script>` standing in for
//! rsync. The script receives the sources and the destination as positional
//! parameters, exactly as rsync would.
//!
//! They verify:
//! - Rotation happens once after a successful sync and never after a failure
//! - Preflight problems stop the run before anything is spawned
//! - Diagnostic output is relayed to the console and the error log
#![cfg(unix)]

use camino::{Utf8Path, Utf8PathBuf};
use rotabackup::models::{PathOverrides, RotationOutcome, RunConfig, RunPhase};
use rotabackup::prompt::{Confirmer, DenyConfirmer};
use rotabackup::services::{PreflightFailure, SearchPath, SINGLE_DESTINATION_ADVISORY};
use rotabackup::{BackupRunner, RunError};
use std::fs;
use tempfile::TempDir;

struct AcceptConfirmer;

impl Confirmer for AcceptConfirmer {
    fn ask(&self, _prompt: &str) -> bool {
        true
    }
}

struct Fixture {
    _temp_dir: TempDir,
    root: Utf8PathBuf,
}

impl Fixture {
    /// Config dir with the given sources, plus destination directories `d1`, `d2`, `d3`.
    fn new(sources: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        fs::create_dir_all(RunConfig::config_dir(&root)).unwrap();
        for name in ["d1", "d2", "d3"] {
            fs::create_dir(root.join(name)).unwrap();
        }

        let fixture = Self {
            _temp_dir: temp_dir,
            root,
        };
        fs::write(fixture.config().configuration, sources).unwrap();
        fixture
    }

    fn dest(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    fn write_rotations(&self, names: &[&str]) {
        let contents: String = names
            .iter()
            .map(|name| format!("{}\n", self.dest(name)))
            .collect();
        fs::write(self.config().rotations, contents).unwrap();
    }

    fn rotations(&self) -> String {
        fs::read_to_string(self.config().rotations).unwrap()
    }

    fn config(&self) -> RunConfig {
        RunConfig::resolve(&self.root, PathOverrides::default())
    }

    /// Configuration whose sync engine runs `script` under sh.
    fn config_with_script(&self, script: &str) -> RunConfig {
        self.config().with_sync_tool("sh", ["-c", script, "sync"])
    }
}

fn output(runner: &BackupRunner<'_, Vec<u8>>) -> String {
    String::from_utf8(runner.console().clone()).unwrap()
}

#[tokio::test]
async fn test_successful_run_rotates_destinations() {
    let fixture = Fixture::new("/home/user/Documents/\n/home/user/Pictures\n");
    fixture.write_rotations(&["d1", "d2"]);
    let args_file = fixture.root.join("args.txt");
    let script = format!("printf '%s\\n' \"$@\" > '{}'", args_file);

    let config = fixture.config_with_script(&script);
    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let outcome = runner.run().await.unwrap();

    assert_eq!(outcome.destination, fixture.dest("d1").as_str());
    assert_eq!(
        outcome.rotation,
        RotationOutcome::Rotated {
            next: fixture.dest("d2").to_string()
        }
    );
    assert_eq!(
        fixture.rotations(),
        format!("{}\n{}\n", fixture.dest("d2"), fixture.dest("d1"))
    );

    // Sources in file order with trailing separators removed, destination last
    assert_eq!(
        fs::read_to_string(&args_file).unwrap(),
        format!(
            "/home/user/Documents\n/home/user/Pictures\n{}\n",
            fixture.dest("d1")
        )
    );

    assert!(output(&runner).contains("Backup successful. Rotating backup destinations..."));
    assert_eq!(
        runner.history(),
        [
            RunPhase::Idle,
            RunPhase::Validating,
            RunPhase::AwaitingDestination,
            RunPhase::Syncing,
            RunPhase::Succeeded
        ]
    );
}

#[tokio::test]
async fn test_consecutive_runs_cycle_through_destinations() {
    let fixture = Fixture::new("/srv/data\n");
    fixture.write_rotations(&["d1", "d2", "d3"]);
    let original = fixture.rotations();

    let mut used = Vec::new();
    for _ in 0..3 {
        let config = fixture.config_with_script("exit 0");
        let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
        used.push(runner.run().await.unwrap().destination);
    }

    assert_eq!(
        used,
        vec![
            fixture.dest("d1").to_string(),
            fixture.dest("d2").to_string(),
            fixture.dest("d3").to_string()
        ]
    );
    assert_eq!(fixture.rotations(), original);
}

#[tokio::test]
async fn test_failed_sync_leaves_rotations_untouched() {
    let fixture = Fixture::new("/srv/data\n");
    fixture.write_rotations(&["d1", "d2"]);
    let before = fs::read(fixture.config().rotations).unwrap();

    let config = fixture.config_with_script("echo 'rsync error: some files could not be transferred' >&2; exit 2");
    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, RunError::SyncFailed(Some(2))));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(fs::read(fixture.config().rotations).unwrap(), before);
    assert_eq!(runner.phase(), RunPhase::Failed);

    let output = output(&runner);
    assert!(output.contains("rsync error: some files could not be transferred"));
    assert!(output.contains("An error occurred during the backup."));
    assert!(!output.contains("Backup successful"));
}

#[tokio::test]
async fn test_single_destination_is_never_rewritten() {
    let fixture = Fixture::new("/srv/data\n");
    // Trailing slash and padding must survive untouched in the file
    fs::write(
        fixture.config().rotations,
        format!("  {}/  \n", fixture.dest("d1")),
    )
    .unwrap();
    let before = fs::read(fixture.config().rotations).unwrap();

    for _ in 0..3 {
        let config = fixture.config_with_script("exit 0");
        let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
        let outcome = runner.run().await.unwrap();

        assert_eq!(outcome.rotation, RotationOutcome::SingleDestination);
        assert_eq!(outcome.destination, fixture.dest("d1").as_str());

        let output = output(&runner);
        assert!(output.contains(SINGLE_DESTINATION_ADVISORY));
        assert!(output.contains("Backup successful. Consider adding more destinations."));
        assert_eq!(fs::read(fixture.config().rotations).unwrap(), before);
    }
}

#[tokio::test]
async fn test_declined_overwrite_aborts_before_spawn() {
    let fixture = Fixture::new("/srv/data\n");
    fixture.write_rotations(&["d1", "d2"]);
    let errorlog = fixture.root.join("rsync.log");
    fs::write(&errorlog, "previous run\n").unwrap();
    let marker = fixture.root.join("spawned");

    let mut config = fixture.config_with_script(&format!("touch '{}'", marker));
    config.errorlog = Some(errorlog.clone());

    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    match err {
        RunError::Preflight(failures) => {
            assert_eq!(failures, vec![PreflightFailure::ErrorLogExists(errorlog.clone())]);
        }
        other => panic!("expected preflight failure, got {other:?}"),
    }
    assert!(!marker.exists());
    assert_eq!(fs::read_to_string(&errorlog).unwrap(), "previous run\n");
    assert!(!runner.history().contains(&RunPhase::Syncing));
    assert!(output(&runner).contains("Error log file already exists"));
}

#[tokio::test]
async fn test_accepted_overwrite_receives_diagnostics() {
    let fixture = Fixture::new("/srv/data\n");
    fixture.write_rotations(&["d1", "d2"]);
    let errorlog = fixture.root.join("rsync.log");
    fs::write(&errorlog, "previous run\n").unwrap();

    let mut config =
        fixture.config_with_script("echo 'file has vanished: /srv/data/tmp' >&2; exit 0");
    config.errorlog = Some(errorlog.clone());

    let mut runner = BackupRunner::new(config, &SearchPath, &AcceptConfirmer, Vec::new());
    runner.run().await.unwrap();

    assert_eq!(
        fs::read_to_string(&errorlog).unwrap(),
        "file has vanished: /srv/data/tmp\n"
    );
    assert!(output(&runner).contains("file has vanished: /srv/data/tmp\n\n"));
}

#[tokio::test]
async fn test_missing_files_are_reported_together() {
    let fixture = Fixture::new("/srv/data\n");
    let mut config = fixture.config_with_script("exit 0");
    config.configuration = fixture.root.join("no-such-configuration");
    config.rotations = fixture.root.join("no-such-rotations");

    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    match err {
        RunError::Preflight(failures) => assert_eq!(failures.len(), 2),
        other => panic!("expected preflight failure, got {other:?}"),
    }

    let output = output(&runner);
    assert!(output.contains("Configuration file does not exist or is not a file"));
    assert!(output.contains("Rotations file does not exist or is not a file"));
}

#[tokio::test]
async fn test_missing_sync_tool() {
    let fixture = Fixture::new("/srv/data\n");
    fixture.write_rotations(&["d1"]);
    let config = fixture
        .config()
        .with_sync_tool("rotabackup-no-such-sync-tool", ["-av"]);

    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Preflight(ref failures)
            if failures == &[PreflightFailure::ToolMissing("rotabackup-no-such-sync-tool".to_string())]
    ));
    assert!(output(&runner).contains(" - rotabackup-no-such-sync-tool"));
}

#[tokio::test]
async fn test_empty_sources() {
    let fixture = Fixture::new("\n   \n");
    fixture.write_rotations(&["d1", "d2"]);

    let config = fixture.config_with_script("exit 0");
    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, RunError::NoSources));
    assert!(output(&runner).contains("No backup sources found.\nExiting..."));
}

#[tokio::test]
async fn test_empty_destinations() {
    let fixture = Fixture::new("/srv/data\n");
    fs::write(fixture.config().rotations, "").unwrap();

    let config = fixture.config_with_script("exit 0");
    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, RunError::NoDestinations));
    assert!(output(&runner).contains("No backup destinations found."));
}

#[tokio::test]
async fn test_unmounted_destination() {
    let fixture = Fixture::new("/srv/data\n");
    let unplugged = fixture.root.join("unplugged-drive");
    fs::write(
        fixture.config().rotations,
        format!("{}\n{}\n", unplugged, fixture.dest("d1")),
    )
    .unwrap();
    let before = fixture.rotations();
    let marker = fixture.root.join("spawned");

    let config = fixture.config_with_script(&format!("touch '{}'", marker));
    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let err = runner.run().await.unwrap_err();

    assert!(matches!(err, RunError::DestinationMissing(ref d) if d == unplugged.as_str()));
    assert!(!marker.exists());
    assert_eq!(fixture.rotations(), before);
    assert!(output(&runner).contains("the device is not mounted"));
    assert_eq!(
        runner.history(),
        [
            RunPhase::Idle,
            RunPhase::Validating,
            RunPhase::AwaitingDestination,
            RunPhase::Failed
        ]
    );
}

#[tokio::test]
async fn test_unsaved_rotation_does_not_fail_the_run() {
    let fixture = Fixture::new("/srv/data\n");
    fixture.write_rotations(&["d1", "d2"]);
    let rotations = fixture.config().rotations;

    // The sync replaces the rotations file with a directory so the save fails
    let script = format!("rm '{0}' && mkdir '{0}'", rotations);
    let config = fixture.config_with_script(&script);
    let mut runner = BackupRunner::new(config, &SearchPath, &DenyConfirmer, Vec::new());
    let outcome = runner.run().await.unwrap();

    assert!(matches!(outcome.rotation, RotationOutcome::PersistFailed { .. }));
    assert_eq!(runner.phase(), RunPhase::Succeeded);
    assert!(output(&runner).contains("Error writing the rotations file"));
    assert!(Utf8Path::new(&rotations).is_dir());
}
