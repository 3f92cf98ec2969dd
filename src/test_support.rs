//! Test support utilities shared across unit and integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::rc::Rc;

use crate::shell::{CommandOutput, CommandRunner, ShellError, ShellSession};
use crate::target::Target;

/// Scripted command runner that returns pre-seeded outputs in FIFO order.
///
/// Used to drive deterministic command outcomes without spawning processes.
/// Clones share the same queues, so a runner handed to a component still
/// records invocations on the original.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    invocations: Rc<RefCell<Vec<CommandInvocation>>>,
}

/// Records a single invocation made through [`ScriptedRunner`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandInvocation {
    /// Program name as passed to the runner.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandInvocation {
    /// Returns a shell-like command string for assertions.
    #[must_use]
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(
            self.args
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

impl ScriptedRunner {
    /// Creates a new runner with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }

    /// Pushes a successful exit status.
    pub fn push_success(&self) {
        self.push_output(Some(0), "", "");
    }

    /// Pushes a failing exit code with stderr text.
    pub fn push_failure(&self, code: i32) {
        self.push_output(Some(code), "", "simulated failure");
    }

    /// Pushes an explicit command output response.
    pub fn push_output(
        &self,
        code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) {
        self.responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        });
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, ShellError> {
        self.invocations.borrow_mut().push(CommandInvocation {
            program: program.to_owned(),
            args: args.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ShellError::Spawn {
                program: program.to_owned(),
                message: String::from("no scripted response available"),
            })
    }
}

/// Scripted [`ShellSession`] recording captured and streamed commands.
#[derive(Clone, Debug)]
pub struct ScriptedSession {
    target: Target,
    windows: bool,
    run_responses: Rc<RefCell<VecDeque<CommandOutput>>>,
    stream_codes: Rc<RefCell<VecDeque<Option<i32>>>>,
    captured_commands: Rc<RefCell<Vec<String>>>,
    streamed_commands: Rc<RefCell<Vec<String>>>,
}

impl ScriptedSession {
    /// Creates a session for the given target.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            windows: false,
            run_responses: Rc::default(),
            stream_codes: Rc::default(),
            captured_commands: Rc::default(),
            streamed_commands: Rc::default(),
        }
    }

    /// Marks the session as targeting a Windows host.
    #[must_use]
    pub fn windows(mut self) -> Self {
        self.windows = true;
        self
    }

    /// Queues a captured-run response.
    pub fn push_run_output(&self, code: Option<i32>, stderr: impl Into<String>) {
        self.run_responses.borrow_mut().push_back(CommandOutput {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        });
    }

    /// Queues an exit code for the next streamed command.
    pub fn push_stream_code(&self, code: Option<i32>) {
        self.stream_codes.borrow_mut().push_back(code);
    }

    /// Commands executed in captured mode, in order.
    #[must_use]
    pub fn captured_commands(&self) -> Vec<String> {
        self.captured_commands.borrow().clone()
    }

    /// Commands executed in streaming mode, in order.
    #[must_use]
    pub fn streamed_commands(&self) -> Vec<String> {
        self.streamed_commands.borrow().clone()
    }

    /// Total number of remote invocations of either kind.
    #[must_use]
    pub fn remote_call_count(&self) -> usize {
        self.captured_commands.borrow().len() + self.streamed_commands.borrow().len()
    }
}

impl ShellSession for ScriptedSession {
    fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        self.captured_commands.borrow_mut().push(command.to_owned());
        self.run_responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ShellError::Spawn {
                program: String::from("ssh"),
                message: String::from("no scripted response available"),
            })
    }

    fn stream(&self, command: &str) -> Result<Option<i32>, ShellError> {
        self.streamed_commands.borrow_mut().push(command.to_owned());
        self.stream_codes
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ShellError::Spawn {
                program: String::from("ssh"),
                message: String::from("no scripted stream response available"),
            })
    }

    fn host(&self) -> &str {
        &self.target.host
    }

    fn connection_string(&self) -> String {
        self.target.connection_string()
    }

    fn rsh_command(&self) -> String {
        String::from("ssh")
    }

    fn windows_target(&self) -> bool {
        self.windows
    }
}
