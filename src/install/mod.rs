//! Local install of the CLI binary.
//!
//! Builds the package for the host in release mode and moves the binary
//! into the install directory (`/usr/local/bin` by default).

use crate::cli::RuntimeConfig;
use crate::config::InstallConfig;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::utils::fs::{regular_file_size, relocate};
use std::path::PathBuf;
use std::time::Duration;

const CARGO_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds and installs the CLI on this machine.
pub struct InstallOrchestrator<R> {
    config: InstallConfig,
    runner: R,
    runtime_config: RuntimeConfig,
}

impl<R: CommandRunner> InstallOrchestrator<R> {
    pub fn new(config: InstallConfig, runner: R, runtime_config: RuntimeConfig) -> Self {
        Self {
            config,
            runner,
            runtime_config,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns the installed binary's path.
    pub async fn run(&self) -> Result<PathBuf> {
        self.ensure_cargo().await?;

        self.runtime_config.progress(&format!(
            "Compiling {} in release mode...",
            self.config.package_name
        ));
        let build = CommandSpec::new("cargo")
            .args(["build", "-p"])
            .arg(&self.config.package_name)
            .arg("--release")
            .current_dir(&self.config.workspace_root)
            .elevated(self.config.privileged);
        let output = self.runner.run(&build).await?;
        if !output.success() {
            return Err(ReleaseError::BuildFailure {
                target: "host".to_string(),
                exit_code: output.exit_code,
            });
        }

        let built = self.config.built_binary();
        if regular_file_size(&built).await.is_none() {
            return Err(ReleaseError::ArtifactMissing {
                target: "host".to_string(),
                path: built,
            });
        }

        let destination = self.config.install_dir.join(
            built
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&self.config.binary_name)),
        );
        self.runtime_config.progress(&format!(
            "Moving {} to {}...",
            self.config.binary_name,
            self.config.install_dir.display()
        ));
        relocate(&self.runner, &built, &destination, self.config.privileged).await?;

        self.runtime_config.success(&format!(
            "Installed. You can now run '{}' from the command line",
            self.config.binary_name
        ));
        Ok(destination)
    }

    async fn ensure_cargo(&self) -> Result<()> {
        let probe = CommandSpec::new("cargo")
            .arg("--version")
            .quiet()
            .timeout(CARGO_PROBE_TIMEOUT);
        match self.runner.run(&probe).await {
            Ok(output) if output.success() => Ok(()),
            _ => Err(ReleaseError::PreconditionFailure {
                check: "toolchain".to_string(),
                reason: "Rust is not installed. Install it with: \
                         curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh"
                    .to_string(),
            }),
        }
    }
}
