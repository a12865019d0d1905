//! Command line entry points for the release, image and install binaries.
//!
//! Each `run_*` function parses its arguments, assembles the configuration
//! from defaults plus `[workspace.metadata.release]`, wires the real command
//! runner and release host into the pipeline, and runs it.

mod args;
mod output;

pub use args::{ImageArgs, InstallArgs, ReleaseArgs, RuntimeConfig, validate_version};
pub use output::OutputManager;

use crate::config::{ImageConfig, InstallConfig, ReleaseConfig};
use crate::error::{CliError, ReleaseError, Result};
use crate::github::GitHubReleases;
use crate::image::ImageOrchestrator;
use crate::install::InstallOrchestrator;
use crate::metadata::{ReleaseMetadata, load_release_metadata};
use crate::process::SystemRunner;
use crate::release::{ArtifactBuilder, ReleaseOrchestrator};
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;

/// `lev-release <version>`
pub async fn run_release() -> Result<i32> {
    let Some(args) = parse_args::<ReleaseArgs>()? else {
        return Ok(0);
    };
    let runtime_config = RuntimeConfig::default();
    let (workspace_root, metadata) = load_workspace()?;

    let mut config = ReleaseConfig::from_metadata(&args.tag, &workspace_root, &metadata)?;
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        config.target_dir = workspace_root.join(target_dir);
    }

    let builder = ArtifactBuilder::from_config(SystemRunner::new(runtime_config.clone()), &config);
    let host = GitHubReleases::from_env(config.release_repository.clone())?;

    let mut orchestrator = ReleaseOrchestrator::new(config, builder, host, runtime_config.clone());
    let report = orchestrator.run().await?;

    runtime_config.success(&format!(
        "All files uploaded successfully: {}",
        report.release_url
    ));
    Ok(0)
}

/// `lev-image <version>`
pub async fn run_image() -> Result<i32> {
    let Some(args) = parse_args::<ImageArgs>()? else {
        return Ok(0);
    };
    if let Err(reason) = validate_version(&args.tag) {
        return Err(CliError::InvalidArguments { reason }.into());
    }
    let runtime_config = RuntimeConfig::default();
    let (workspace_root, metadata) = load_workspace()?;

    let config = ImageConfig::from_metadata(&args.tag, &workspace_root, &metadata)?;
    let orchestrator = ImageOrchestrator::new(
        config,
        SystemRunner::new(runtime_config.clone()),
        runtime_config,
    );
    orchestrator.run().await?;
    Ok(0)
}

/// `lev-install`
pub async fn run_install() -> Result<i32> {
    if parse_args::<InstallArgs>()?.is_none() {
        return Ok(0);
    }
    let runtime_config = RuntimeConfig::default();
    let (workspace_root, metadata) = load_workspace()?;

    let mut config = InstallConfig::from_metadata(&workspace_root, &metadata);
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        config.target_dir = workspace_root.join(target_dir);
    }

    let orchestrator = InstallOrchestrator::new(
        config,
        SystemRunner::new(runtime_config.clone()),
        runtime_config,
    );
    orchestrator.run().await?;
    Ok(0)
}

/// Prints a failure and its recovery suggestions to stderr.
pub fn report_error(error: &ReleaseError) {
    let output = RuntimeConfig::new(false, false);
    output.error(&error.to_string());
    for suggestion in error.recovery_suggestions() {
        output.indent(&suggestion);
    }
}

/// Parses process arguments. `None` means help or version was printed.
fn parse_args<P: Parser>() -> Result<Option<P>> {
    match P::try_parse() {
        Ok(args) => Ok(Some(args)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            Ok(None)
        }
        Err(e) => {
            let _ = e.print();
            Err(CliError::InvalidArguments {
                reason: "run with --help for usage".to_string(),
            }
            .into())
        }
    }
}

/// Current directory and the release overrides of its Cargo.toml.
fn load_workspace() -> Result<(PathBuf, ReleaseMetadata)> {
    let workspace_root = std::env::current_dir()?;
    let metadata = load_release_metadata(&workspace_root.join("Cargo.toml"))?;
    Ok((workspace_root, metadata))
}
