//! Command runner abstraction and process-backed implementations.
//!
//! Captured execution buffers output for inspection; streaming execution
//! tees the child's output to the local terminal as it is produced while
//! still recording it, so remote provisioning progress is visible live and
//! the exit status contract stays uniform.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use shell_escape::unix::escape;
use thiserror::Error;

/// Result of running an external command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Errors raised while launching external commands.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ShellError {
    /// Raised when a command cannot be spawned.
    #[error("failed to spawn {program}: {message}")]
    Spawn {
        /// Command that failed to start.
        program: String,
        /// Operating system error string.
        message: String,
    },
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs `program` with the given arguments and reports its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Spawn`] if the command cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, ShellError>;
}

/// Real command runner that captures stdout and stderr.
#[derive(Clone, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, ShellError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| spawn_error(program, &err))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Command runner that forwards child output to the local terminal as it
/// arrives, while also capturing it.
#[derive(Clone, Debug, Default)]
pub struct StreamingCommandRunner;

impl CommandRunner for StreamingCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, ShellError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| spawn_error(program, &err))?;

        let stdout_tee = child
            .stdout
            .take()
            .map(|pipe| thread::spawn(move || tee_stream(pipe, io::stdout())));
        let stderr_tee = child
            .stderr
            .take()
            .map(|pipe| thread::spawn(move || tee_stream(pipe, io::stderr())));

        let status = child.wait().map_err(|err| spawn_error(program, &err))?;

        Ok(CommandOutput {
            code: status.code(),
            stdout: collect_capture(stdout_tee),
            stderr: collect_capture(stderr_tee),
        })
    }
}

fn spawn_error(program: &str, err: &io::Error) -> ShellError {
    ShellError::Spawn {
        program: program.to_owned(),
        message: err.to_string(),
    }
}

/// Copies `reader` to `writer` chunk by chunk, flushing after each write so
/// partial lines reach the terminal, and returns everything read.
fn tee_stream<R: Read, W: Write>(mut reader: R, mut writer: W) -> Vec<u8> {
    let mut captured = Vec::new();
    let mut buf = [0_u8; 8192];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(len) => {
                let Some(chunk) = buf.get(..len) else { break };
                writer.write_all(chunk).ok();
                writer.flush().ok();
                captured.extend_from_slice(chunk);
            }
            Err(_) => break,
        }
    }
    captured
}

fn collect_capture(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle.map_or_else(String::new, |tee| {
        tee.join().map_or_else(
            |_| String::new(),
            |bytes| String::from_utf8_lossy(&bytes).into_owned(),
        )
    })
}

/// Renders a program and argument vector as a copy-pasteable shell line.
///
/// Arguments containing shell metacharacters are quoted; the rendering is
/// used for the pre-transfer command echo and for assertions in tests, never
/// for execution.
#[must_use]
pub fn render_command_line(program: &str, args: &[OsString]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program.to_owned());
    parts.extend(
        args.iter()
            .map(|arg| escape(arg.to_string_lossy()).into_owned()),
    );
    parts.join(" ")
}
