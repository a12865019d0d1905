//! Release tag checks.

use crate::error::{CliError, ReleaseError, Result};

/// Checks a release tag before anything is built.
///
/// Tags are used verbatim. Ones that are not semantic versions (with or
/// without a leading `v`) are still accepted, with a warning, because the
/// hosting service does not require it.
pub fn check_version_tag(tag: &str) -> Result<Option<semver::Version>> {
    if let Err(reason) = crate::cli::validate_version(tag) {
        return Err(ReleaseError::Cli(CliError::InvalidArguments { reason }));
    }

    let numeric = tag.strip_prefix('v').unwrap_or(tag);
    match semver::Version::parse(numeric) {
        Ok(version) => Ok(Some(version)),
        Err(e) => {
            log::warn!("Release tag {} is not a semantic version ({}), using it as-is", tag, e);
            Ok(None)
        }
    }
}
