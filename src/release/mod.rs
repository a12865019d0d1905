//! Cross-target release pipeline.
//!
//! The [`ReleaseOrchestrator`] walks the [`TargetMatrix`] through a
//! [`TargetBuilder`] one entry at a time and, only when every target built,
//! publishes the collected [`BuildArtifact`]s through a [`ReleaseHost`].
//!
//! # Module Organization
//!
//! - [`matrix`] - platform list and its uniqueness invariant
//! - [`artifact`] - toolchain invocation, existence check and rename
//! - [`publish`] - the release hosting seam
//! - [`orchestrator`] - the stage machine tying them together
//! - [`version`] - release tag checks

pub mod artifact;
pub mod matrix;
pub mod orchestrator;
pub mod publish;
pub mod version;

pub use artifact::{ArtifactBuilder, BuildArtifact, TargetBuilder};
pub use matrix::{TargetMatrix, TargetSpec};
pub use orchestrator::{ReleaseOrchestrator, ReleaseReport, ReleaseStage};
pub use publish::{ReleaseDescriptor, ReleaseHost, ReleaseRecord};
