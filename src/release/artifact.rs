//! Per-target artifact production.

use super::TargetSpec;
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::utils::fs::{regular_file_size, relocate};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for the `cargo --version` probe
const TOOLCHAIN_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// A compiled binary renamed to its publish-ready name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Asset name on the release
    pub output_name: String,
    pub local_path: PathBuf,
    pub size_bytes: u64,
}

/// Produces one [`BuildArtifact`] per matrix entry.
pub trait TargetBuilder {
    /// Fails with [`ReleaseError::PreconditionFailure`] when the toolchain
    /// cannot be run at all.
    fn ensure_toolchain(&self) -> impl Future<Output = Result<()>> + Send;

    /// Builds `package_name` for `spec` and moves the binary to its output name.
    fn build(
        &self,
        spec: &TargetSpec,
        package_name: &str,
    ) -> impl Future<Output = Result<BuildArtifact>> + Send;
}

/// Builds targets with cargo.
///
/// Runs `cargo build --release --target <triple> -p <package>` from the
/// workspace root, then moves `target/<triple>/release/<binary>` to
/// `<output_dir>/<output name>`.
#[derive(Debug)]
pub struct ArtifactBuilder<R> {
    runner: R,
    workspace_root: PathBuf,
    target_dir: PathBuf,
    output_dir: PathBuf,
    binary_name: Option<String>,
    privileged: bool,
}

impl<R> ArtifactBuilder<R> {
    pub fn new(runner: R, workspace_root: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        let workspace_root = workspace_root.as_ref().to_path_buf();
        Self {
            runner,
            target_dir: workspace_root.join("target"),
            workspace_root,
            output_dir: output_dir.as_ref().to_path_buf(),
            binary_name: None,
            privileged: false,
        }
    }

    pub fn from_config(runner: R, config: &ReleaseConfig) -> Self {
        Self::new(runner, &config.workspace_root, &config.output_dir)
            .target_dir(&config.target_dir)
            .binary_name(&config.binary_name)
            .privileged(config.privileged)
    }

    /// Overrides the cargo target directory.
    pub fn target_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.target_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Binary file name when it differs from the package name.
    pub fn binary_name(mut self, name: impl Into<String>) -> Self {
        self.binary_name = Some(name.into());
        self
    }

    /// Invoke cargo through `sudo`.
    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Where cargo leaves the binary for `spec`.
    pub fn expected_binary(&self, spec: &TargetSpec, package_name: &str) -> PathBuf {
        let name = self.binary_name.as_deref().unwrap_or(package_name);
        let file_name = if spec.is_windows() {
            format!("{name}.exe")
        } else {
            name.to_string()
        };
        self.target_dir
            .join(&spec.build_identifier)
            .join("release")
            .join(file_name)
    }

    pub fn build_command(&self, spec: &TargetSpec, package_name: &str) -> CommandSpec {
        CommandSpec::new("cargo")
            .args(["build", "--release", "--target"])
            .arg(&spec.build_identifier)
            .args(["-p", package_name])
            .current_dir(&self.workspace_root)
            .elevated(self.privileged)
    }
}

impl<R: CommandRunner + Sync> TargetBuilder for ArtifactBuilder<R> {
    async fn ensure_toolchain(&self) -> Result<()> {
        let probe = CommandSpec::new("cargo")
            .arg("--version")
            .quiet()
            .timeout(TOOLCHAIN_PROBE_TIMEOUT);

        match self.runner.run(&probe).await {
            Ok(output) if output.success() => {
                log::info!("Using {}", output.stdout.trim());
                Ok(())
            }
            Ok(output) => Err(ReleaseError::PreconditionFailure {
                check: "toolchain".to_string(),
                reason: format!(
                    "`cargo --version` exited with code {}: {}",
                    output.exit_code,
                    output.last_message().unwrap_or("no output")
                ),
            }),
            Err(e) => Err(ReleaseError::PreconditionFailure {
                check: "toolchain".to_string(),
                reason: format!(
                    "Rust is not installed ({e}). Install it with: \
                     curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh"
                ),
            }),
        }
    }

    async fn build(&self, spec: &TargetSpec, package_name: &str) -> Result<BuildArtifact> {
        log::info!("Building {} for {}", package_name, spec.build_identifier);

        let output = self.runner.run(&self.build_command(spec, package_name)).await?;
        if !output.success() {
            return Err(ReleaseError::BuildFailure {
                target: spec.build_identifier.clone(),
                exit_code: output.exit_code,
            });
        }

        // A zero exit status alone is not proof the binary exists
        let produced = self.expected_binary(spec, package_name);
        let Some(size_bytes) = regular_file_size(&produced).await else {
            return Err(ReleaseError::ArtifactMissing {
                target: spec.build_identifier.clone(),
                path: produced,
            });
        };

        let destination = self.output_dir.join(&spec.output_name);
        relocate(&self.runner, &produced, &destination, self.privileged).await?;
        log::debug!(
            "Moved {} to {} ({} bytes)",
            produced.display(),
            destination.display(),
            size_bytes
        );

        Ok(BuildArtifact {
            output_name: spec.output_name.clone(),
            local_path: destination,
            size_bytes,
        })
    }
}
