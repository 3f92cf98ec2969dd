//! Remote shell sessions over the system `ssh` client.
//!
//! [`ShellSession`] is the interface the pipeline consumes: captured runs
//! for probes, streamed runs for the final provisioning command, and the
//! connection-derived capabilities (target strings, `--rsh` command,
//! Windows flag) every stage that embeds remote values needs.

use std::ffi::OsString;

use log::debug;

use crate::settings::KitchenSettings;
use crate::target::Target;

mod path_tools;
mod types;

pub use path_tools::{PathTools, adjust_cygwin_path, portable_mkdir_command};
pub use types::{
    CommandOutput, CommandRunner, ProcessCommandRunner, ShellError, StreamingCommandRunner,
    render_command_line,
};

/// Established connection to the target host.
///
/// Implementations are injected into the pipeline; tests substitute
/// scripted doubles.
pub trait ShellSession {
    /// Executes `command` remotely, capturing its output and exit status.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError`] when the ssh client cannot be started.
    fn run(&self, command: &str) -> Result<CommandOutput, ShellError>;

    /// Executes `command` remotely, forwarding its output live to the
    /// invoking terminal, and returns the remote exit code (`None` when the
    /// session terminated without one).
    ///
    /// # Errors
    ///
    /// Returns [`ShellError`] when the ssh client cannot be started.
    fn stream(&self, command: &str) -> Result<Option<i32>, ShellError>;

    /// Hostname or address of the target machine.
    fn host(&self) -> &str;

    /// `user@host` (or bare `host`) string for ssh argv entries and rsync
    /// destinations.
    fn connection_string(&self) -> String;

    /// Remote-shell command embedded in rsync's `--rsh` option.
    fn rsh_command(&self) -> String;

    /// Whether the connection targets a Windows host (Cygwin rsync paths).
    fn windows_target(&self) -> bool;
}

/// [`ShellSession`] backed by the system `ssh` client.
#[derive(Clone, Debug)]
pub struct SshSession<C: CommandRunner, S: CommandRunner> {
    ssh_bin: String,
    ssh_options: String,
    windows: bool,
    target: Target,
    captured: C,
    streamer: S,
}

impl SshSession<ProcessCommandRunner, StreamingCommandRunner> {
    /// Builds a session over the real process runners.
    #[must_use]
    pub fn connect(settings: &KitchenSettings, target: Target) -> Self {
        Self::new(settings, target, ProcessCommandRunner, StreamingCommandRunner)
    }
}

impl<C: CommandRunner, S: CommandRunner> SshSession<C, S> {
    /// Builds a session using the provided captured and streaming runners.
    #[must_use]
    pub fn new(settings: &KitchenSettings, target: Target, captured: C, streamer: S) -> Self {
        Self {
            ssh_bin: settings.ssh_bin.clone(),
            ssh_options: settings.ssh_options.clone(),
            windows: settings.windows_target,
            target,
            captured,
            streamer,
        }
    }

    fn build_ssh_args(&self, command: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = self
            .ssh_options
            .split_whitespace()
            .map(OsString::from)
            .collect();
        args.push(OsString::from(self.target.connection_string()));
        args.push(OsString::from(command));
        args
    }
}

impl<C: CommandRunner, S: CommandRunner> ShellSession for SshSession<C, S> {
    fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        debug!("captured remote command: {command}");
        self.captured.run(&self.ssh_bin, &self.build_ssh_args(command))
    }

    fn stream(&self, command: &str) -> Result<Option<i32>, ShellError> {
        debug!("streamed remote command: {command}");
        let output = self
            .streamer
            .run(&self.ssh_bin, &self.build_ssh_args(command))?;
        Ok(output.code)
    }

    fn host(&self) -> &str {
        &self.target.host
    }

    fn connection_string(&self) -> String {
        self.target.connection_string()
    }

    fn rsh_command(&self) -> String {
        if self.ssh_options.trim().is_empty() {
            self.ssh_bin.clone()
        } else {
            format!("{} {}", self.ssh_bin, self.ssh_options.trim())
        }
    }

    fn windows_target(&self) -> bool {
        self.windows
    }
}
