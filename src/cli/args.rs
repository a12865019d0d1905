//! Command line argument parsing.
//!
//! Each binary takes at most the version string. Everything else comes from
//! `[workspace.metadata.release]` in Cargo.toml and the environment.

use clap::Parser;

/// Build every release target and publish them as a GitHub release
#[derive(Parser, Debug)]
#[command(
    name = "lev-release",
    version,
    about = "Build lev for every release target and publish a GitHub release",
    long_about = "Builds the package for every target in the release matrix, renames each \
binary to its public asset name and publishes all of them on a single GitHub release.

Usage:
  GITHUB_TOKEN=<token> lev-release v0.1.5

Nothing is uploaded unless every target builds. Exit code 0 = every asset was uploaded."
)]
pub struct ReleaseArgs {
    /// Version string, used verbatim as git tag and release title (e.g. v0.1.5)
    #[arg(value_name = "VERSION")]
    pub tag: String,
}

/// Build and push the multi-architecture server image
#[derive(Parser, Debug)]
#[command(
    name = "lev-image",
    version,
    about = "Build and push the multi-architecture container image",
    long_about = "Checks for docker, buildx and a registry login, then builds the image for \
linux/amd64 and linux/arm64 and pushes it tagged with VERSION.

Usage:
  lev-image v0.1.5"
)]
pub struct ImageArgs {
    /// Image tag to push (e.g. v0.1.5)
    #[arg(value_name = "VERSION")]
    pub tag: String,
}

/// Build the CLI for this machine and install it
#[derive(Parser, Debug)]
#[command(
    name = "lev-install",
    version,
    about = "Build the CLI in release mode and install it into /usr/local/bin"
)]
pub struct InstallArgs {}

/// Validates a version argument.
pub fn validate_version(version: &str) -> Result<(), String> {
    if version.trim().is_empty() {
        return Err("Version cannot be empty".to_string());
    }
    if version.chars().any(char::is_whitespace) {
        return Err(format!("Version must not contain whitespace: {version:?}"));
    }
    Ok(())
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        self.output.verbose(message)
    }

    pub fn success(&self, message: &str) {
        self.output.success(message)
    }

    pub fn warn(&self, message: &str) {
        self.output.warn(message)
    }

    pub fn error(&self, message: &str) {
        self.output.error(message)
    }

    pub fn progress(&self, message: &str) {
        self.output.progress(message)
    }

    pub fn section(&self, title: &str) {
        self.output.section(title)
    }

    pub fn indent(&self, message: &str) {
        self.output.indent(message)
    }
}

impl Default for RuntimeConfig {
    /// Verbose, never quiet
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_takes_one_positional_version() {
        let args = ReleaseArgs::try_parse_from(["lev-release", "v0.1.5"]).unwrap();
        assert_eq!(args.tag, "v0.1.5");

        assert!(ReleaseArgs::try_parse_from(["lev-release"]).is_err());
        assert!(ReleaseArgs::try_parse_from(["lev-release", "v1", "v2"]).is_err());
        assert!(ReleaseArgs::try_parse_from(["lev-release", "--draft", "v1"]).is_err());
    }

    #[test]
    fn version_flag_is_not_the_positional() {
        let err = ReleaseArgs::try_parse_from(["lev-release", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let args = ImageArgs::try_parse_from(["lev-image", "v0.2.0"]).unwrap();
        assert_eq!(args.tag, "v0.2.0");
        let err = ImageArgs::try_parse_from(["lev-image", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn install_takes_no_arguments() {
        assert!(InstallArgs::try_parse_from(["lev-install"]).is_ok());
        assert!(InstallArgs::try_parse_from(["lev-install", "v1"]).is_err());
    }

    #[test]
    fn version_validation() {
        assert!(validate_version("v0.1.5").is_ok());
        assert!(validate_version("").is_err());
        assert!(validate_version("v0.1 .5").is_err());
    }
}
