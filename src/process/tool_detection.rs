//! Resolution of external tools on `PATH`.

use std::path::PathBuf;

/// Resolves `program` to an executable path.
///
/// Paths containing a separator are taken as given; bare names are looked up
/// on `PATH`.
pub fn locate(program: &str) -> Option<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found: {}", program, e);
            None
        }
    }
}
