//! Subprocess execution on the host via tokio.

use super::{CommandOutput, CommandRunner, CommandSpec, locate};
use crate::cli::RuntimeConfig;
use crate::error::{CliError, ReleaseError, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Runs commands as child processes of the release tool.
///
/// Output is read line by line while the child runs; streamed commands echo
/// each line through the [`RuntimeConfig`], quiet ones only capture.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    runtime_config: RuntimeConfig,
}

impl SystemRunner {
    pub fn new(runtime_config: RuntimeConfig) -> Self {
        Self { runtime_config }
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let rendered = command.display();

        let program = locate(command.program()).ok_or_else(|| {
            ReleaseError::Cli(CliError::ExecutionFailed {
                command: rendered.clone(),
                reason: format!("`{}` is not installed or not on PATH", command.program()),
            })
        })?;

        log::debug!("Running: {}", rendered);

        let mut process = Command::new(&program);
        process
            .args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = command.get_current_dir() {
            process.current_dir(dir);
        }

        let mut child = process.spawn().map_err(|e| {
            ReleaseError::Cli(CliError::ExecutionFailed {
                command: rendered.clone(),
                reason: e.to_string(),
            })
        })?;

        let echo = command.streams_output().then_some(&self.runtime_config);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = {
            let completion = async {
                // Both pipes must be drained before waiting, or a chatty child blocks
                let (stdout, stderr) =
                    tokio::join!(collect_lines(stdout, echo), collect_lines(stderr, echo));
                let status = child.wait().await;
                (stdout, stderr, status)
            };
            match command.get_timeout() {
                Some(limit) => tokio::time::timeout(limit, completion).await.ok(),
                None => Some(completion.await),
            }
        };

        match finished {
            Some((stdout, stderr, Ok(status))) => {
                let exit_code = status.code().unwrap_or(-1);
                log::debug!("{} exited with code {}", rendered, exit_code);
                Ok(CommandOutput {
                    exit_code,
                    stdout,
                    stderr,
                })
            }
            Some((_, _, Err(e))) => Err(ReleaseError::Cli(CliError::ExecutionFailed {
                command: rendered,
                reason: e.to_string(),
            })),
            None => {
                let limit = command.get_timeout().unwrap_or_default();
                log::warn!("{} timed out after {}s, terminating", rendered, limit.as_secs());

                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill {}: {}", command.program(), e);
                }
                // Reap the child so it does not linger as a zombie
                let _ = tokio::time::timeout(Duration::from_secs(10), child.wait()).await;

                Err(ReleaseError::Cli(CliError::ExecutionFailed {
                    command: rendered,
                    reason: format!("timed out after {} seconds", limit.as_secs()),
                }))
            }
        }
    }
}

/// Reads a child pipe to the end, echoing lines when asked.
///
/// Lines are split on raw bytes and decoded lossily; compiler and linker
/// output is not always UTF-8, and the pipe must stay open until EOF.
async fn collect_lines<R>(pipe: Option<R>, echo: Option<&RuntimeConfig>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let Some(pipe) = pipe else {
        return captured;
    };

    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if let Some(config) = echo {
                    config.indent(line);
                }
                captured.push_str(line);
                captured.push('\n');
            }
            Err(e) => {
                log::warn!("Stopped reading child output: {}", e);
                break;
            }
        }
    }
    captured
}
