use crate::config::clean_entry;
use crate::models::SyncReport;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

/// Size of a single stderr read; a read returns as soon as any output is available.
const CHUNK_SIZE: usize = 1024;

/// Errors that can occur while running the sync engine
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create error log {path}: {source}")]
    ErrorLog {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Process error: {0}")]
    Io(#[from] io::Error),
}

/// A composed sync invocation: program plus argument array, no shell involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SyncCommand {
    /// Base flags, then each cleaned source in order, then the destination.
    pub fn build(
        program: impl Into<PathBuf>,
        base_args: &[String],
        sources: &[String],
        destination: &str,
    ) -> Self {
        let mut args = base_args.to_vec();
        args.extend(sources.iter().map(|s| clean_entry(s).to_string()));
        args.push(clean_entry(destination).to_string());

        Self {
            program: program.into(),
            args,
        }
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs the sync engine and relays its diagnostics live.
///
/// stdin and stdout are inherited; stderr is piped and echoed to the
/// console one chunk at a time, flushed after each chunk, and optionally
/// copied into an error log. The exit status is only collected once stderr
/// reaches end of file, so output written just before exit is never lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncService;

impl SyncService {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `command` and stream its stderr until it exits.
    ///
    /// Ctrl-C is delivered to the child through the terminal's process
    /// group. This process only notes it so that the run counts as failed.
    pub async fn execute<W>(
        &self,
        command: &SyncCommand,
        console: &mut W,
        errorlog: Option<&Utf8Path>,
    ) -> Result<SyncReport, SyncError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut log = match errorlog {
            Some(path) => Some(File::create(path).await.map_err(|source| {
                SyncError::ErrorLog {
                    path: path.to_path_buf(),
                    source,
                }
            })?),
            None => None,
        };

        tracing::info!("Executing: {}", command);
        let start = Instant::now();

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SyncError::Spawn {
                program: command.program.display().to_string(),
                source,
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("sync process stderr was not captured"))?;

        let mut interrupted = false;
        let streamed = {
            let pump = Self::pump(stderr, console, log.as_mut());
            tokio::pin!(pump);

            let mut listening = true;
            loop {
                tokio::select! {
                    result = &mut pump => break result,
                    signal = tokio::signal::ctrl_c(), if listening => {
                        listening = false;
                        match signal {
                            Ok(()) => {
                                tracing::warn!("Interrupted, waiting for the sync process to exit");
                                interrupted = true;
                            }
                            Err(e) => tracing::warn!("Could not listen for Ctrl-C: {}", e),
                        }
                    }
                }
            }
        };

        // The child must not outlive a run that has already failed
        let bytes_streamed = match streamed {
            Ok(total) => total,
            Err(e) => {
                tracing::error!("Lost the console while syncing, stopping the sync process: {}", e);
                if let Err(kill_err) = child.start_kill() {
                    tracing::warn!("Failed to stop the sync process: {}", kill_err);
                }
                if let Err(wait_err) = child.wait().await {
                    tracing::warn!("Failed to reap the sync process: {}", wait_err);
                }
                return Err(e.into());
            }
        };

        let status = child.wait().await?;

        if let Some(file) = log.as_mut() {
            if let Err(e) = file.flush().await {
                tracing::warn!("Failed to flush error log: {}", e);
            }
        }

        let report = SyncReport {
            exit_code: status.code(),
            interrupted,
            bytes_streamed,
            duration: start.elapsed(),
        };

        tracing::info!(
            "Sync process completed in {:.2}s with exit code {:?} ({} bytes of diagnostics)",
            report.duration.as_secs_f32(),
            report.exit_code,
            report.bytes_streamed
        );

        Ok(report)
    }

    /// Copy `reader` to `console` chunk by chunk until end of file.
    ///
    /// A failing error log is dropped with a warning; a failing console is an error.
    pub async fn pump<R, W, L>(
        mut reader: R,
        console: &mut W,
        mut log: Option<&mut L>,
    ) -> io::Result<u64>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        L: AsyncWrite + Unpin,
    {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            let chunk = &buf[..n];

            console.write_all(chunk).await?;
            console.flush().await?;

            if let Some(file) = log.as_deref_mut() {
                if let Err(e) = file.write_all(chunk).await {
                    tracing::warn!("Error log write failed, no longer logging: {}", e);
                    log = None;
                }
            }

            total += n as u64;
        }

        Ok(total)
    }
}
