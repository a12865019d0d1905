//! Multi-architecture container image pipeline.
//!
//! Independent of the binary release: three fail-fast gates (engine,
//! buildx, registry login) and then a single `docker buildx build --push`.

mod availability;
mod builder;
mod orchestrator;

pub use availability::{Gate, precondition_gates};
pub use builder::build_and_push_command;
pub use orchestrator::ImageOrchestrator;

use std::time::Duration;

/// Registry namespace the image is pushed under
pub const DEFAULT_NAMESPACE: &str = "leverans";

/// Image name within the namespace
pub const DEFAULT_IMAGE: &str = "manager";

/// Architectures in every pushed tag
pub const IMAGE_PLATFORMS: &[&str] = &["linux/amd64", "linux/arm64"];

/// Upper bound for a single gate probe. The build itself is unbounded.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(60);
