//! Release tooling for lev.
//!
//! Three independent pipelines, each a binary of this crate:
//! - `lev-release <version>` builds the CLI for every target in the release
//!   matrix and publishes the binaries as assets of one GitHub release
//! - `lev-image <version>` builds and pushes the multi-architecture server image
//! - `lev-install` builds the CLI for this machine and installs it
//!
//! Pipelines are generic over [`process::CommandRunner`] and
//! [`release::ReleaseHost`], so they can run against fakes.

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod image;
pub mod install;
pub mod metadata;
pub mod process;
pub mod release;
pub mod utils;

// Re-export commonly used types
pub use config::{ImageConfig, InstallConfig, ReleaseConfig, Repository};
pub use error::{CliError, ReleaseError, Result};
pub use release::{
    ArtifactBuilder, BuildArtifact, ReleaseOrchestrator, ReleaseStage, TargetMatrix, TargetSpec,
};
