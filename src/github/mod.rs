//! GitHub releases as the release host.
//!
//! Talks to the REST API directly: one `POST /repos/{owner}/{repo}/releases`
//! per run and one streamed upload per asset.

mod client;
mod types;

pub use client::{GITHUB_API_URL, GitHubReleases};
pub use types::{ApiError, CreateReleaseRequest, ReleaseResponse};
