//! File system utilities for artifact handling.

use crate::error::{ReleaseError, Result};
use crate::process::{CommandRunner, CommandSpec};
use std::io;
use std::path::Path;
use tokio::fs;

/// Creates `path` and its parents. Succeeds if it already exists.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Moves a regular file, replacing any existing file at `to`.
///
/// Uses a rename, which is atomic on one filesystem. Across filesystems the
/// file is copied and the source removed, so the source never survives a
/// successful move.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            log::debug!(
                "{} and {} are on different filesystems, copying",
                from.display(),
                to.display()
            );
            fs::copy(from, to).await?;
            fs::remove_file(from).await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Moves a build output to its final place.
///
/// Binaries from a `sudo` build sit in root-owned directories, so a
/// privileged move goes through `sudo mv` on `runner` instead of a rename.
pub async fn relocate<R: CommandRunner>(
    runner: &R,
    from: &Path,
    to: &Path,
    privileged: bool,
) -> Result<()> {
    if !privileged {
        return move_file(from, to).await;
    }

    let mv = CommandSpec::new("mv")
        .arg(from.display().to_string())
        .arg(to.display().to_string())
        .quiet()
        .elevated(true);
    let output = runner.run(&mv).await?;
    if output.success() {
        Ok(())
    } else {
        Err(ReleaseError::PreconditionFailure {
            check: "move".to_string(),
            reason: format!(
                "could not move {} to {}: {}",
                from.display(),
                to.display(),
                output.last_message().unwrap_or("sudo mv failed")
            ),
        })
    }
}

/// Size of `path` if it is a regular file.
pub async fn regular_file_size(path: &Path) -> Option<u64> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => Some(metadata.len()),
        _ => None,
    }
}
