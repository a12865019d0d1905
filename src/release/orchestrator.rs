//! Release stage machine.
//!
//! ```text
//! Init ──> BuildingTargets ──> Publishing ──> Done
//!   │             │                 │
//!   └─────────────┴────> Failed <───┘
//! ```
//!
//! No asset is uploaded before every target has built. A failure while
//! publishing leaves the release partially populated on the remote side;
//! nothing is rolled back or retried.

use super::version::check_version_tag;
use super::{BuildArtifact, ReleaseHost, ReleaseRecord, TargetBuilder};
use crate::cli::RuntimeConfig;
use crate::config::ReleaseConfig;
use crate::error::{ReleaseError, Result};
use crate::utils::{fs::create_dir_all, time::format_elapsed};
use chrono::TimeDelta;
use std::time::Instant;

/// Where a release run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseStage {
    Init,
    BuildingTargets,
    Publishing,
    Done,
    /// Terminal; holds the error message
    Failed(String),
}

/// Outcome of a completed release.
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub version_tag: String,
    pub release_url: String,
    /// Asset names in upload order
    pub uploaded: Vec<String>,
    pub elapsed: TimeDelta,
}

/// Drives one release: build every target, then publish every artifact.
pub struct ReleaseOrchestrator<B, H> {
    config: ReleaseConfig,
    builder: B,
    host: H,
    runtime_config: RuntimeConfig,
    stage: ReleaseStage,
}

impl<B: TargetBuilder, H: ReleaseHost> ReleaseOrchestrator<B, H> {
    pub fn new(config: ReleaseConfig, builder: B, host: H, runtime_config: RuntimeConfig) -> Self {
        Self {
            config,
            builder,
            host,
            runtime_config,
            stage: ReleaseStage::Init,
        }
    }

    pub fn stage(&self) -> &ReleaseStage {
        &self.stage
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Runs the release to completion or to the first failure.
    pub async fn run(&mut self) -> Result<ReleaseReport> {
        let started = Instant::now();
        match self.execute(started).await {
            Ok(report) => {
                self.transition(ReleaseStage::Done);
                Ok(report)
            }
            Err(e) => {
                self.transition(ReleaseStage::from(&e));
                Err(e)
            }
        }
    }

    async fn execute(&mut self, started: Instant) -> Result<ReleaseReport> {
        self.initialize().await?;

        self.transition(ReleaseStage::BuildingTargets);
        let artifacts = self.build_targets().await?;

        self.transition(ReleaseStage::Publishing);
        let (release, uploaded) = self.publish(&artifacts).await?;

        let elapsed = TimeDelta::from_std(started.elapsed()).unwrap_or(TimeDelta::zero());
        self.runtime_config.success(&format!(
            "Released {} with {} assets in {}",
            self.config.version_tag,
            uploaded.len(),
            format_elapsed(elapsed)
        ));

        Ok(ReleaseReport {
            version_tag: self.config.version_tag.clone(),
            release_url: release.html_url,
            uploaded,
            elapsed,
        })
    }

    /// Gates that must pass before anything touches disk or the remote side.
    async fn initialize(&self) -> Result<()> {
        self.runtime_config.section(&format!(
            "Releasing {} {} to {}",
            self.config.package_name, self.config.version_tag, self.config.release_repository
        ));

        check_version_tag(&self.config.version_tag)?;
        self.builder.ensure_toolchain().await?;
        // Checked up front so a missing token never costs a full matrix build
        self.host.ensure_authenticated()?;

        create_dir_all(&self.config.output_dir).await?;
        self.runtime_config.verbose_println(&format!(
            "Artifacts will be collected in {}",
            self.config.output_dir.display()
        ));
        Ok(())
    }

    async fn build_targets(&self) -> Result<Vec<BuildArtifact>> {
        let total = self.config.target_matrix.len();
        let mut artifacts = Vec::with_capacity(total);

        for (index, spec) in self.config.target_matrix.iter().enumerate() {
            self.runtime_config.progress(&format!(
                "[{}/{}] Building {} for {}",
                index + 1,
                total,
                self.config.package_name,
                spec.build_identifier
            ));

            match self.builder.build(spec, &self.config.package_name).await {
                Ok(artifact) => {
                    self.runtime_config.success(&format!(
                        "{} ({} bytes)",
                        artifact.output_name, artifact.size_bytes
                    ));
                    artifacts.push(artifact);
                }
                Err(e) => {
                    if !artifacts.is_empty() {
                        log::info!(
                            "Leaving {} already-built artifacts in {}",
                            artifacts.len(),
                            self.config.output_dir.display()
                        );
                    }
                    return Err(e);
                }
            }
        }

        Ok(artifacts)
    }

    async fn publish(&self, artifacts: &[BuildArtifact]) -> Result<(ReleaseRecord, Vec<String>)> {
        let descriptor = self.config.descriptor();
        self.runtime_config
            .progress(&format!("Creating release {}", descriptor.version_tag));
        let release = self.host.create_release(&descriptor).await?;
        self.runtime_config
            .success(&format!("Created release {}", release.html_url));

        self.runtime_config.progress("Uploading assets...");
        let mut uploaded = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            if let Err(e) = self.host.upload_asset(&release, artifact).await {
                self.report_partial_release(&release, &uploaded);
                return Err(e);
            }
            self.runtime_config
                .success(&format!("Uploaded {}", artifact.output_name));
            uploaded.push(artifact.output_name.clone());
        }

        Ok((release, uploaded))
    }

    fn report_partial_release(&self, release: &ReleaseRecord, uploaded: &[String]) {
        let summary = if uploaded.is_empty() {
            "no assets".to_string()
        } else {
            uploaded.join(", ")
        };
        log::warn!(
            "Release {} left partially populated with {}",
            release.tag,
            summary
        );
        self.runtime_config.warn(&format!(
            "Release {} exists with only: {}",
            release.html_url, summary
        ));
    }

    fn transition(&mut self, next: ReleaseStage) {
        log::debug!("Release stage: {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }
}

impl From<&ReleaseError> for ReleaseStage {
    fn from(error: &ReleaseError) -> Self {
        ReleaseStage::Failed(error.to_string())
    }
}
