//! Image pipeline driver.

use super::{build_and_push_command, precondition_gates};
use crate::cli::RuntimeConfig;
use crate::config::ImageConfig;
use crate::error::{ReleaseError, Result};
use crate::process::CommandRunner;

/// Checks the container toolchain, then builds and pushes one
/// multi-architecture tag.
pub struct ImageOrchestrator<R> {
    config: ImageConfig,
    runner: R,
    runtime_config: RuntimeConfig,
}

impl<R: CommandRunner> ImageOrchestrator<R> {
    pub fn new(config: ImageConfig, runner: R, runtime_config: RuntimeConfig) -> Self {
        Self {
            config,
            runner,
            runtime_config,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns the pushed image reference.
    ///
    /// Any failing gate aborts before the build starts, so a long build
    /// never ends in a push that was bound to fail.
    pub async fn run(&self) -> Result<String> {
        let image_ref = self.config.image_ref();
        self.runtime_config
            .section(&format!("Building image {image_ref}"));

        for gate in precondition_gates() {
            self.runtime_config
                .verbose_println(&format!("Checking {}...", gate.name));
            gate.check(&self.runner).await?;
            log::debug!("Gate {} passed", gate.name);
        }
        self.runtime_config.success("Docker, buildx and registry login available");

        self.runtime_config.progress(&format!(
            "Building {} for {}",
            image_ref,
            self.config.platforms.join(", ")
        ));
        let output = self.runner.run(&build_and_push_command(&self.config)).await?;
        if !output.success() {
            return Err(ReleaseError::ImageBuildFailure {
                tag: image_ref,
                exit_code: output.exit_code,
            });
        }

        self.runtime_config.success(&format!("Pushed {image_ref}"));
        Ok(image_ref)
    }
}
