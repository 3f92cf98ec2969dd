//! Kitchen transfer over the system `rsync` binary.
//!
//! The kitchen mirror is delete-aware: files gone locally disappear
//! remotely. Patch uploads reuse the same transport without the mirror
//! semantics. Every remote path embedded in a locally built command goes
//! through the session's path adjustment so Cygwin-hosted targets receive
//! `/cygdrive` forms.

use std::ffi::OsString;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use thiserror::Error;

use crate::shell::{CommandRunner, PathTools, ShellError, ShellSession, render_command_line};

/// Directories excluded from the kitchen mirror.
const MIRROR_EXCLUSIONS: [&str; 3] = ["revision-deploys", "tmp", ".*"];

/// Errors surfaced while transferring kitchen content.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SyncError {
    /// Raised when the sync source directory does not exist.
    #[error("sync source directory missing: {path}")]
    MissingSource {
        /// Path that was expected to be transferred.
        path: Utf8PathBuf,
    },
    /// Raised when the transfer command cannot be started.
    #[error(transparent)]
    Shell(#[from] ShellError),
    /// Raised when `rsync` completes with a non-zero exit code.
    #[error("{program} exited with status {status_text}: {stderr}")]
    CommandFailure {
        /// Command name used for the attempted operation.
        program: String,
        /// Exit status as reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the process.
        stderr: String,
    },
}

/// Transfers kitchen content to the target host via rsync.
#[derive(Clone, Debug)]
pub struct KitchenSyncer<R: CommandRunner> {
    rsync_bin: String,
    runner: R,
}

impl<R: CommandRunner> KitchenSyncer<R> {
    /// Creates a syncer shelling out to `rsync_bin` through `runner`.
    #[must_use]
    pub const fn new(rsync_bin: String, runner: R) -> Self {
        Self { rsync_bin, runner }
    }

    /// Mirrors `source` onto the remote cache path, deleting remote files
    /// that no longer exist locally.
    ///
    /// The exact command line is written to `out` before execution so the
    /// operator can reproduce the transfer by hand.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingSource`] when `source` is absent, or
    /// [`SyncError::CommandFailure`] when rsync exits non-zero.
    pub fn mirror<S: ShellSession>(
        &self,
        session: &S,
        source: &Utf8Path,
        remote_path: &str,
        out: &mut impl Write,
    ) -> Result<(), SyncError> {
        let args = self.build_mirror_args(session, source, remote_path)?;
        writeln!(out, "{}", render_command_line(&self.rsync_bin, &args)).ok();
        self.execute(&args)
    }

    /// Copies a single local file into the remote directory, without the
    /// mirror semantics of [`KitchenSyncer::mirror`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::CommandFailure`] when rsync exits non-zero.
    pub fn copy_file<S: ShellSession>(
        &self,
        session: &S,
        file: &Utf8Path,
        remote_path: &str,
    ) -> Result<(), SyncError> {
        let args = build_copy_args(session, file, remote_path);
        debug!("{}", render_command_line(&self.rsync_bin, &args));
        self.execute(&args)
    }

    fn build_mirror_args<S: ShellSession>(
        &self,
        session: &S,
        source: &Utf8Path,
        remote_path: &str,
    ) -> Result<Vec<OsString>, SyncError> {
        if !source.is_dir() {
            return Err(SyncError::MissingSource {
                path: source.to_path_buf(),
            });
        }

        let mut args = vec![
            OsString::from("-rl"),
            OsString::from("--rsh"),
            OsString::from(session.rsh_command()),
            OsString::from("--times"),
            OsString::from("--compress"),
            OsString::from("--delete"),
        ];
        for exclusion in MIRROR_EXCLUSIONS {
            args.push(OsString::from("--exclude"));
            args.push(OsString::from(exclusion));
        }
        args.push(OsString::from(format!("{source}/")));
        args.push(OsString::from(destination(session, remote_path)));
        Ok(args)
    }

    fn execute(&self, args: &[OsString]) -> Result<(), SyncError> {
        let output = self.runner.run(&self.rsync_bin, args)?;
        if output.is_success() {
            return Ok(());
        }

        let status_text = output
            .code
            .map_or_else(|| String::from("unknown"), |code| code.to_string());
        Err(SyncError::CommandFailure {
            program: self.rsync_bin.clone(),
            status: output.code,
            status_text,
            stderr: output.stderr,
        })
    }
}

fn build_copy_args<S: ShellSession>(
    session: &S,
    file: &Utf8Path,
    remote_path: &str,
) -> Vec<OsString> {
    vec![
        OsString::from("-rl"),
        OsString::from("--rsh"),
        OsString::from(session.rsh_command()),
        OsString::from(file.as_str()),
        OsString::from(destination(session, remote_path)),
    ]
}

/// Renders the rsync destination, applying the session's path adjustment.
fn destination<S: ShellSession>(session: &S, remote_path: &str) -> String {
    format!(
        "{}:{}",
        session.connection_string(),
        session.adjust_remote_path(remote_path)
    )
}
