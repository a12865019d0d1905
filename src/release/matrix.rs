//! Target matrix: every platform a release ships a binary for.

use crate::error::{ReleaseError, Result};
use std::collections::HashSet;

/// One platform to build: a target triple and the asset name it is
/// published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Toolchain target triple, e.g. `x86_64-unknown-linux-gnu`
    pub build_identifier: String,
    /// Canonical published artifact name, e.g. `linux-amd64`
    pub output_name: String,
}

impl TargetSpec {
    /// Creates a target spec.
    pub fn new(build_identifier: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            build_identifier: build_identifier.into(),
            output_name: output_name.into(),
        }
    }

    /// Whether the toolchain appends `.exe` to binaries for this target.
    pub fn is_windows(&self) -> bool {
        self.build_identifier.contains("-windows-")
    }
}

/// Platforms published with every release, in build order.
const DEFAULT_TARGETS: &[(&str, &str)] = &[
    ("x86_64-unknown-linux-gnu", "linux-amd64"),
    ("aarch64-unknown-linux-gnu", "linux-arm64"),
    ("x86_64-apple-darwin", "macos-amd64"),
    ("aarch64-apple-darwin", "macos-arm64"),
    ("x86_64-pc-windows-msvc", "windows-amd64"),
    ("aarch64-pc-windows-msvc", "windows-arm64"),
];

/// Ordered, immutable set of [`TargetSpec`]s.
///
/// Output names are unique: two entries sharing one would overwrite each
/// other's asset on the release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMatrix {
    entries: Vec<TargetSpec>,
}

impl TargetMatrix {
    /// Validates and wraps a list of targets.
    ///
    /// # Errors
    ///
    /// [`ReleaseError::InvalidMatrix`] when the list is empty, an entry has an
    /// empty field, or two entries share an output name.
    pub fn new(entries: Vec<TargetSpec>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ReleaseError::InvalidMatrix {
                reason: "matrix has no targets".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for spec in &entries {
            if spec.build_identifier.trim().is_empty() || spec.output_name.trim().is_empty() {
                return Err(ReleaseError::InvalidMatrix {
                    reason: format!(
                        "entry ({:?}, {:?}) has an empty field",
                        spec.build_identifier, spec.output_name
                    ),
                });
            }
            if !seen.insert(spec.output_name.as_str()) {
                return Err(ReleaseError::InvalidMatrix {
                    reason: format!(
                        "output name {} is used by more than one target",
                        spec.output_name
                    ),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Iterates entries in build order. Every call starts from the first entry.
    pub fn iter(&self) -> std::slice::Iter<'_, TargetSpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Published asset names in build order.
    pub fn output_names(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.output_name.as_str()).collect()
    }
}

impl Default for TargetMatrix {
    fn default() -> Self {
        Self {
            entries: DEFAULT_TARGETS
                .iter()
                .map(|(triple, name)| TargetSpec::new(*triple, *name))
                .collect(),
        }
    }
}
