//! Release settings read from the workspace Cargo.toml.
//!
//! ```toml
//! [workspace.metadata.release]
//! package = "lev"
//! repository = "ethanhamilthon/leverans"
//! image = "leverans/manager"
//! output-dir = "target/dist"
//! ```
//!
//! `[package.metadata.release]` is consulted when the workspace table is
//! absent. Every key is optional.

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Overrides for the built-in release defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReleaseMetadata {
    /// Cargo package to build
    pub package: Option<String>,
    /// Binary name when it differs from the package name
    pub binary: Option<String>,
    /// GitHub repository as `owner/name`
    pub repository: Option<String>,
    /// Container image as `namespace/name`
    pub image: Option<String>,
    /// Artifact directory, relative to the workspace root
    pub output_dir: Option<PathBuf>,
    /// Release body
    pub description: Option<String>,
    /// Install directory for `lev-install`
    pub install_dir: Option<PathBuf>,
    /// Run cargo (and the install move) through sudo
    pub privileged: Option<bool>,
}

/// Loads release overrides from `cargo_toml_path`.
///
/// A missing manifest or a manifest without a release table yields the
/// defaults; a malformed one is an error.
pub fn load_release_metadata(cargo_toml_path: &Path) -> Result<ReleaseMetadata> {
    if !cargo_toml_path.exists() {
        log::debug!(
            "No manifest at {}, using release defaults",
            cargo_toml_path.display()
        );
        return Ok(ReleaseMetadata::default());
    }

    let manifest = std::fs::read_to_string(cargo_toml_path)?;
    parse_release_metadata(&manifest)
}

/// Extracts release overrides from manifest text.
pub fn parse_release_metadata(manifest: &str) -> Result<ReleaseMetadata> {
    let toml_value: toml::Value = toml::from_str(manifest)?;

    let table = ["workspace", "package"].into_iter().find_map(|section| {
        toml_value
            .get(section)
            .and_then(|s| s.get("metadata"))
            .and_then(|m| m.get("release"))
    });

    match table {
        Some(table) => {
            let metadata: ReleaseMetadata = table.clone().try_into()?;
            log::debug!("Loaded release metadata: {:?}", metadata);
            Ok(metadata)
        }
        None => Ok(ReleaseMetadata::default()),
    }
}
