//! Release hosting seam.

use super::BuildArtifact;
use crate::error::Result;
use std::future::Future;

/// Everything needed to create one release record. Written once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub version_tag: String,
    pub title: String,
    pub description: String,
    pub is_draft: bool,
    pub is_prerelease: bool,
}

/// Handle to a release owned by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub id: u64,
    pub tag: String,
    /// Browser URL of the release page
    pub html_url: String,
    /// Asset upload endpoint, possibly an RFC 6570 template
    pub upload_url: String,
}

/// A service that hosts versioned releases and their binary assets.
pub trait ReleaseHost {
    /// Fails with [`crate::ReleaseError::AuthenticationMissing`] when no
    /// credential is configured. Performs no remote call.
    fn ensure_authenticated(&self) -> Result<()>;

    /// Creates the release. Not idempotent: a second call for the same tag
    /// fails with [`crate::ReleaseError::ReleaseCreateFailure`].
    fn create_release(
        &self,
        descriptor: &ReleaseDescriptor,
    ) -> impl Future<Output = Result<ReleaseRecord>> + Send;

    /// Attaches `artifact` to `release` under its output name.
    ///
    /// Earlier uploads are left in place if this fails.
    fn upload_asset(
        &self,
        release: &ReleaseRecord,
        artifact: &BuildArtifact,
    ) -> impl Future<Output = Result<()>> + Send;
}
