//! External command execution.
//!
//! Every toolchain, container engine and privilege-escalation call goes
//! through [`CommandRunner`], so pipelines can be driven by a fake runner in
//! tests and by [`SystemRunner`] in the binaries.

mod runner;
mod tool_detection;

pub use runner::SystemRunner;
pub use tool_detection::locate;

use crate::error::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    stream_output: bool,
    timeout: Option<Duration>,
}

impl CommandSpec {
    /// Creates a command that streams its output and runs without a time limit.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            stream_output: true,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the command from `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Captures output without echoing it to the terminal.
    pub fn quiet(mut self) -> Self {
        self.stream_output = false;
        self
    }

    /// Kills the command if it has not exited after `limit`.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Prefixes the command with `sudo` when `elevate` is set.
    pub fn elevated(self, elevate: bool) -> Self {
        if !elevate {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
            ..self
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn streams_output(&self) -> bool {
        self.stream_output
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Shell-like rendering for messages, e.g. `docker buildx version`.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code, -1 when terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Last non-empty stderr line, falling back to stdout; used in
    /// precondition messages.
    pub fn last_message(&self) -> Option<&str> {
        fn last(text: &str) -> Option<&str> {
            text.lines().map(str::trim).rfind(|line| !line.is_empty())
        }
        last(&self.stderr).or_else(|| last(&self.stdout))
    }
}

/// Runs an external command to completion, blocking the pipeline until it exits.
///
/// A nonzero exit is reported through [`CommandOutput::exit_code`], not as an
/// error; `Err` means the command could not be started or waited on.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send;
}

impl<R: CommandRunner + Sync> CommandRunner for &R {
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<CommandOutput>> + Send {
        (**self).run(command)
    }
}
