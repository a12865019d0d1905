//! Pipeline configuration.
//!
//! Every pipeline receives its settings as an explicit struct at
//! construction; defaults match the lev project and can be overridden from
//! `[workspace.metadata.release]` (see [`crate::metadata`]).

use crate::error::{CliError, ReleaseError, Result};
use crate::metadata::ReleaseMetadata;
use crate::release::{ReleaseDescriptor, TargetMatrix};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Workspace package released by default
pub const DEFAULT_PACKAGE: &str = "lev";

/// GitHub repository receiving releases by default
pub const DEFAULT_REPOSITORY: &str = "ethanhamilthon/leverans";

/// Release body used when none is configured
pub const DEFAULT_DESCRIPTION: &str = "Automated release";

/// Where renamed artifacts are collected, relative to the workspace root
pub const DEFAULT_OUTPUT_DIR: &str = "target/dist";

/// Where `lev-install` puts the binary
pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

/// Environment variable holding the GitHub token
pub const TOKEN_VARIABLE: &str = "GITHUB_TOKEN";

/// Environment variable overriding the GitHub API root (set by GitHub
/// Actions, and on GitHub Enterprise runners)
pub const API_URL_VARIABLE: &str = "GITHUB_API_URL";

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ReleaseError::Cli(CliError::InvalidArguments {
                reason: format!("Repository must be in owner/name form, got {s:?}"),
            })),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Settings for one release run.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Tag and title of the release, verbatim from the command line
    pub version_tag: String,
    /// Cargo package to build (`-p`)
    pub package_name: String,
    /// Binary file produced by the package; usually the package name
    pub binary_name: String,
    pub target_matrix: TargetMatrix,
    pub release_repository: Repository,
    /// Directory holding the workspace Cargo.toml
    pub workspace_root: PathBuf,
    /// Cargo target directory; `<workspace_root>/target` unless overridden
    pub target_dir: PathBuf,
    /// Directory receiving renamed artifacts
    pub output_dir: PathBuf,
    pub description: String,
    pub draft: bool,
    pub prerelease: bool,
    /// Run the toolchain through `sudo`
    pub privileged: bool,
}

impl ReleaseConfig {
    /// Defaults for `version_tag` with the workspace at `workspace_root`.
    pub fn new(version_tag: impl Into<String>, workspace_root: impl AsRef<Path>) -> Self {
        let workspace_root = workspace_root.as_ref().to_path_buf();
        Self {
            version_tag: version_tag.into(),
            package_name: DEFAULT_PACKAGE.to_string(),
            binary_name: DEFAULT_PACKAGE.to_string(),
            target_matrix: TargetMatrix::default(),
            release_repository: Repository {
                owner: "ethanhamilthon".to_string(),
                name: "leverans".to_string(),
            },
            target_dir: workspace_root.join("target"),
            output_dir: workspace_root.join(DEFAULT_OUTPUT_DIR),
            workspace_root,
            description: DEFAULT_DESCRIPTION.to_string(),
            draft: false,
            prerelease: false,
            privileged: false,
        }
    }

    /// Defaults with manifest overrides applied.
    pub fn from_metadata(
        version_tag: impl Into<String>,
        workspace_root: impl AsRef<Path>,
        metadata: &ReleaseMetadata,
    ) -> Result<Self> {
        let mut config = Self::new(version_tag, workspace_root);

        if let Some(package) = &metadata.package {
            config.package_name = package.clone();
            config.binary_name = package.clone();
        }
        if let Some(binary) = &metadata.binary {
            config.binary_name = binary.clone();
        }
        if let Some(repository) = &metadata.repository {
            config.release_repository = repository.parse()?;
        }
        if let Some(output_dir) = &metadata.output_dir {
            config.output_dir = config.workspace_root.join(output_dir);
        }
        if let Some(description) = &metadata.description {
            config.description = description.clone();
        }
        if let Some(privileged) = metadata.privileged {
            config.privileged = privileged;
        }

        Ok(config)
    }

    /// The release record this run creates. Title equals the tag.
    pub fn descriptor(&self) -> ReleaseDescriptor {
        ReleaseDescriptor {
            version_tag: self.version_tag.clone(),
            title: self.version_tag.clone(),
            description: self.description.clone(),
            is_draft: self.draft,
            is_prerelease: self.prerelease,
        }
    }
}

/// Settings for building and pushing the container image.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Registry namespace, e.g. `leverans`
    pub namespace: String,
    /// Image name within the namespace, e.g. `manager`
    pub image: String,
    pub version: String,
    /// Platforms passed to `buildx --platform`
    pub platforms: Vec<String>,
    /// Build context directory
    pub context: PathBuf,
}

impl ImageConfig {
    pub fn new(version: impl Into<String>, context: impl AsRef<Path>) -> Self {
        Self {
            namespace: crate::image::DEFAULT_NAMESPACE.to_string(),
            image: crate::image::DEFAULT_IMAGE.to_string(),
            version: version.into(),
            platforms: crate::image::IMAGE_PLATFORMS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            context: context.as_ref().to_path_buf(),
        }
    }

    pub fn from_metadata(
        version: impl Into<String>,
        context: impl AsRef<Path>,
        metadata: &ReleaseMetadata,
    ) -> Result<Self> {
        let mut config = Self::new(version, context);
        if let Some(image) = &metadata.image {
            let (namespace, name) = image
                .split_once('/')
                .filter(|(ns, name)| !ns.is_empty() && !name.is_empty())
                .ok_or_else(|| {
                    ReleaseError::Cli(CliError::InvalidArguments {
                        reason: format!("Image must be in namespace/name form, got {image:?}"),
                    })
                })?;
            config.namespace = namespace.to_string();
            config.image = name.to_string();
        }
        Ok(config)
    }

    /// Full reference pushed to the registry: `<namespace>/<image>:<version>`.
    pub fn image_ref(&self) -> String {
        format!("{}/{}:{}", self.namespace, self.image, self.version)
    }
}

/// Settings for a local install of the CLI.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    pub package_name: String,
    pub binary_name: String,
    pub workspace_root: PathBuf,
    pub target_dir: PathBuf,
    pub install_dir: PathBuf,
    /// Build and move through `sudo`
    pub privileged: bool,
}

impl InstallConfig {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        let workspace_root = workspace_root.as_ref().to_path_buf();
        Self {
            package_name: DEFAULT_PACKAGE.to_string(),
            binary_name: DEFAULT_PACKAGE.to_string(),
            target_dir: workspace_root.join("target"),
            workspace_root,
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            privileged: false,
        }
    }

    pub fn from_metadata(workspace_root: impl AsRef<Path>, metadata: &ReleaseMetadata) -> Self {
        let mut config = Self::new(workspace_root);
        if let Some(package) = &metadata.package {
            config.package_name = package.clone();
            config.binary_name = package.clone();
        }
        if let Some(binary) = &metadata.binary {
            config.binary_name = binary.clone();
        }
        if let Some(install_dir) = &metadata.install_dir {
            config.install_dir = install_dir.clone();
        }
        if let Some(privileged) = metadata.privileged {
            config.privileged = privileged;
        }
        config
    }

    /// Where cargo leaves the host release binary.
    pub fn built_binary(&self) -> PathBuf {
        self.target_dir
            .join("release")
            .join(format!("{}{}", self.binary_name, std::env::consts::EXE_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_parsing() {
        let repo: Repository = "ethanhamilthon/leverans".parse().unwrap();
        assert_eq!(repo.owner, "ethanhamilthon");
        assert_eq!(repo.to_string(), DEFAULT_REPOSITORY);

        assert!("leverans".parse::<Repository>().is_err());
        assert!("/leverans".parse::<Repository>().is_err());
        assert!("a/b/c".parse::<Repository>().is_err());
    }

    #[test]
    fn defaults_match_project() {
        let config = ReleaseConfig::new("v0.1.5", "/work");
        assert_eq!(config.package_name, "lev");
        assert_eq!(config.release_repository.to_string(), DEFAULT_REPOSITORY);
        assert_eq!(config.output_dir, Path::new("/work/target/dist"));
        assert_eq!(config.target_dir, Path::new("/work/target"));
        assert!(!config.privileged);

        let descriptor = config.descriptor();
        assert_eq!(descriptor.version_tag, "v0.1.5");
        assert_eq!(descriptor.title, "v0.1.5");
        assert_eq!(descriptor.description, DEFAULT_DESCRIPTION);
        assert!(!descriptor.is_draft && !descriptor.is_prerelease);
    }

    #[test]
    fn metadata_overrides_apply() {
        let metadata = ReleaseMetadata {
            package: Some("lev-cli".into()),
            repository: Some("acme/tools".into()),
            output_dir: Some("out".into()),
            privileged: Some(true),
            ..Default::default()
        };
        let config = ReleaseConfig::from_metadata("v1.0.0", "/work", &metadata).unwrap();
        assert_eq!(config.package_name, "lev-cli");
        assert_eq!(config.binary_name, "lev-cli");
        assert_eq!(config.release_repository.to_string(), "acme/tools");
        assert_eq!(config.output_dir, Path::new("/work/out"));
        assert!(config.privileged);
    }

    #[test]
    fn image_reference() {
        let config = ImageConfig::new("v0.1.5", ".");
        assert_eq!(config.image_ref(), "leverans/manager:v0.1.5");
        assert_eq!(config.platforms, ["linux/amd64", "linux/arm64"]);

        let metadata = ReleaseMetadata {
            image: Some("acme/server".into()),
            ..Default::default()
        };
        let config = ImageConfig::from_metadata("1.2.3", ".", &metadata).unwrap();
        assert_eq!(config.image_ref(), "acme/server:1.2.3");

        let bad = ReleaseMetadata {
            image: Some("server".into()),
            ..Default::default()
        };
        assert!(ImageConfig::from_metadata("1.2.3", ".", &bad).is_err());
    }
}
