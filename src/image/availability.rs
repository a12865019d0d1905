//! Container toolchain precondition gates.

use super::PROBE_TIMEOUT;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, CommandSpec};

/// One fail-fast check run before the image build.
#[derive(Debug, Clone)]
pub struct Gate {
    /// Short name used in [`ReleaseError::PreconditionFailure`]
    pub name: &'static str,
    pub command: CommandSpec,
    /// What to tell the user when the gate fails
    pub help: &'static str,
}

impl Gate {
    /// Runs the probe; any spawn error or nonzero exit fails the gate.
    pub async fn check<R: CommandRunner>(&self, runner: &R) -> Result<()> {
        let reason = match runner.run(&self.command).await {
            Ok(output) if output.success() => return Ok(()),
            Ok(output) => format!(
                "`{}` exited with code {}{}",
                self.command.display(),
                output.exit_code,
                output
                    .last_message()
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default()
            ),
            Err(e) => e.to_string(),
        };

        Err(ReleaseError::PreconditionFailure {
            check: self.name.to_string(),
            reason: format!("{}. {}", reason, self.help),
        })
    }
}

/// Gates in the order they must pass: engine, multi-arch builder, registry session.
pub fn precondition_gates() -> Vec<Gate> {
    vec![
        Gate {
            name: "docker",
            command: CommandSpec::new("docker")
                .arg("--version")
                .quiet()
                .timeout(PROBE_TIMEOUT),
            help: "Docker is not installed. Install it from https://docs.docker.com/get-docker/",
        },
        Gate {
            name: "buildx",
            command: CommandSpec::new("docker")
                .args(["buildx", "version"])
                .quiet()
                .timeout(PROBE_TIMEOUT),
            help: "Docker Buildx is not installed. Install the buildx plugin and try again",
        },
        Gate {
            name: "registry login",
            // Non-interactive: succeeds only with stored credentials
            command: CommandSpec::new("docker")
                .arg("login")
                .quiet()
                .timeout(PROBE_TIMEOUT),
            help: "Docker login failed. Run `docker login` and try again",
        },
    ]
}
