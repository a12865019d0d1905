//! Error types for release, image and install pipelines.
//!
//! Every failure aborts the run that produced it. Nothing here is retried, so
//! each variant carries enough context to name the failed target or asset.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument and command spawn errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// A required tool, directory or session is not available
    #[error("Precondition failed ({check}): {reason}")]
    PreconditionFailure {
        /// Name of the failed gate
        check: String,
        /// What was observed
        reason: String,
    },

    /// No credential for the release hosting service
    #[error("Authentication missing: set the {variable} environment variable")]
    AuthenticationMissing {
        /// Environment variable expected to hold the token
        variable: String,
    },

    /// Target matrix violates its construction invariants
    #[error("Invalid target matrix: {reason}")]
    InvalidMatrix {
        /// Offending entry description
        reason: String,
    },

    /// Toolchain exited nonzero for a target
    #[error("Build failed for target {target} (exit code: {exit_code})")]
    BuildFailure {
        /// Build identifier (target triple)
        target: String,
        /// Toolchain exit code, -1 when killed by a signal
        exit_code: i32,
    },

    /// Toolchain reported success but the binary is not where it should be
    #[error("Build for target {target} succeeded but no binary was found at {}", path.display())]
    ArtifactMissing {
        /// Build identifier (target triple)
        target: String,
        /// Path that was checked
        path: PathBuf,
    },

    /// Hosting service rejected release creation
    #[error("Failed to create release {tag}: {reason}")]
    ReleaseCreateFailure {
        /// Version tag of the release
        tag: String,
        /// Response status/body or transport error
        reason: String,
    },

    /// One asset failed to attach to the release
    #[error("Failed to upload asset {asset}: {reason}")]
    UploadFailure {
        /// Published asset name
        asset: String,
        /// I/O or API error
        reason: String,
    },

    /// `docker buildx build --push` exited nonzero
    #[error("Image build-and-push failed for {tag} (exit code: {exit_code})")]
    ImageBuildFailure {
        /// Full image reference
        tag: String,
        /// Exit code of the build invocation
        exit_code: i32,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::PreconditionFailure { check, .. } => vec![format!(
                "Install or configure the missing prerequisite ({check}) and run again"
            )],
            Self::AuthenticationMissing { variable } => vec![
                format!("Export a token with repository write access: export {variable}=<token>"),
            ],
            Self::InvalidMatrix { .. } => {
                vec!["Give every target a distinct, non-empty output name".to_string()]
            }
            Self::BuildFailure { target, .. } => vec![
                format!("Check that the target is installed: rustup target add {target}"),
                "Cross-compiling may need a linker for the target platform".to_string(),
                "No release was created; artifacts built before the failure were left on disk"
                    .to_string(),
            ],
            Self::ArtifactMissing { path, .. } => vec![format!(
                "Verify the package produces a binary named {}",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            )],
            Self::ReleaseCreateFailure { tag, .. } => vec![
                format!("A release or tag named {tag} may already exist"),
                "Delete the existing release and tag, or use a new version".to_string(),
            ],
            Self::UploadFailure { .. } => vec![
                "The release was created and is only partially populated".to_string(),
                "Delete the release and its tag manually before re-running; \
                 a re-run will fail on release creation otherwise"
                    .to_string(),
            ],
            Self::ImageBuildFailure { .. } => vec![
                "Check the build output above; multi-arch builds need a buildx builder \
                 with QEMU or native nodes for every platform"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    ///
    /// No step is retried, so no failure is recoverable within a run.
    pub fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_failure_names_target() {
        let err = ReleaseError::BuildFailure {
            target: "aarch64-apple-darwin".into(),
            exit_code: 101,
        };
        assert!(err.to_string().contains("aarch64-apple-darwin"));
        assert!(err.to_string().contains("101"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn upload_failure_suggests_manual_cleanup() {
        let err = ReleaseError::UploadFailure {
            asset: "linux-arm64".into(),
            reason: "connection reset".into(),
        };
        assert!(err.to_string().contains("linux-arm64"));
        assert!(
            err.recovery_suggestions()
                .iter()
                .any(|s| s.contains("partially populated"))
        );
    }
}
