//! Filesystem and formatting helpers shared by the pipelines.

pub mod fs;
pub mod time;
