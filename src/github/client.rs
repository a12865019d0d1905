//! GitHub REST client for release creation and asset upload.

use super::types::{ApiError, CreateReleaseRequest, ReleaseResponse};
use crate::config::{API_URL_VARIABLE, Repository, TOKEN_VARIABLE};
use crate::error::{ReleaseError, Result};
use crate::release::{BuildArtifact, ReleaseDescriptor, ReleaseHost, ReleaseRecord};
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use tokio_util::io::ReaderStream;
use url::Url;

/// Public GitHub API endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const ASSET_CONTENT_TYPE: &str = "application/octet-stream";

/// Release host backed by a GitHub repository.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    http: reqwest::Client,
    api_base: String,
    repository: Repository,
    token: Option<String>,
}

impl GitHubReleases {
    /// Creates a client; an empty token counts as no token.
    pub fn new(repository: Repository, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReleaseError::PreconditionFailure {
                check: "http client".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_client(repository, token, http))
    }

    /// Creates a client authenticated by `GITHUB_TOKEN`, if set, talking to
    /// `GITHUB_API_URL` when that is set.
    pub fn from_env(repository: Repository) -> Result<Self> {
        let client = Self::new(repository, std::env::var(TOKEN_VARIABLE).ok())?;
        match std::env::var(API_URL_VARIABLE) {
            Ok(api_base) if !api_base.trim().is_empty() => {
                log::debug!("Using GitHub API at {}", api_base);
                Ok(client.with_api_base(api_base))
            }
            _ => Ok(client),
        }
    }

    pub fn with_client(repository: Repository, token: Option<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            api_base: GITHUB_API_URL.to_string(),
            repository,
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Points the client at another API root (GitHub Enterprise, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| ReleaseError::AuthenticationMissing {
                variable: TOKEN_VARIABLE.to_string(),
            })
    }

    fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base.trim_end_matches('/'),
            self.repository.owner,
            self.repository.name
        )
    }
}

/// Expands a release's `upload_url` template for one asset.
///
/// GitHub returns e.g. `https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}`.
pub fn upload_endpoint(upload_url: &str, asset_name: &str) -> std::result::Result<Url, url::ParseError> {
    let base = upload_url.split('{').next().unwrap_or(upload_url);
    let mut url = Url::parse(base)?;
    url.query_pairs_mut().append_pair("name", asset_name);
    Ok(url)
}

impl ReleaseHost for GitHubReleases {
    fn ensure_authenticated(&self) -> Result<()> {
        self.token().map(|_| ())
    }

    async fn create_release(&self, descriptor: &ReleaseDescriptor) -> Result<ReleaseRecord> {
        let token = self.token()?;
        let failure = |reason: String| ReleaseError::ReleaseCreateFailure {
            tag: descriptor.version_tag.clone(),
            reason,
        };

        let request = CreateReleaseRequest {
            tag_name: &descriptor.version_tag,
            name: &descriptor.title,
            body: &descriptor.description,
            draft: descriptor.is_draft,
            prerelease: descriptor.is_prerelease,
        };

        log::debug!("POST {}", self.releases_url());
        let response = self
            .http
            .post(self.releases_url())
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!("{status}: {}", ApiError::describe(&body))));
        }

        let created: ReleaseResponse = response
            .json()
            .await
            .map_err(|e| failure(format!("unexpected response body: {e}")))?;
        log::info!("Created release {} (id {})", created.tag_name, created.id);

        Ok(ReleaseRecord {
            id: created.id,
            tag: created.tag_name,
            html_url: created.html_url,
            upload_url: created.upload_url,
        })
    }

    async fn upload_asset(&self, release: &ReleaseRecord, artifact: &BuildArtifact) -> Result<()> {
        let token = self.token()?;
        let failure = |reason: String| ReleaseError::UploadFailure {
            asset: artifact.output_name.clone(),
            reason,
        };

        let endpoint = upload_endpoint(&release.upload_url, &artifact.output_name)
            .map_err(|e| failure(format!("invalid upload URL {}: {e}", release.upload_url)))?;

        let file = tokio::fs::File::open(&artifact.local_path)
            .await
            .map_err(|e| failure(format!("cannot open {}: {e}", artifact.local_path.display())))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| failure(format!("cannot stat {}: {e}", artifact.local_path.display())))?
            .len();

        // Streamed so large binaries are never held in memory
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        log::debug!("Uploading {} ({} bytes) to {}", artifact.output_name, length, endpoint);
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
            .header(CONTENT_TYPE, ASSET_CONTENT_TYPE)
            .header(CONTENT_LENGTH, length)
            .body(body)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!("{status}: {}", ApiError::describe(&body))));
        }

        log::info!("Uploaded {} to release {}", artifact.output_name, release.tag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// One HTTP request as seen by the stub server
    struct Recorded {
        request_line: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl Recorded {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    async fn read_request(socket: &mut TcpStream) -> Recorded {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = buf[header_end..].to_vec();
        while body.len() < length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }

        Recorded {
            request_line,
            headers,
            body,
        }
    }

    /// Answers one connection per canned response, then returns what it saw.
    fn spawn_stub(listener: TcpListener, responses: Vec<(u16, String)>) -> JoinHandle<Vec<Recorded>> {
        tokio::spawn(async move {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                recorded.push(read_request(&mut socket).await);
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            recorded
        })
    }

    async fn stub_base() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        (listener, base)
    }

    fn client(api_base: &str, token: Option<&str>) -> GitHubReleases {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GitHubReleases::with_client(
            "ethanhamilthon/leverans".parse().unwrap(),
            token.map(String::from),
            http,
        )
        .with_api_base(api_base)
    }

    fn descriptor() -> ReleaseDescriptor {
        ReleaseDescriptor {
            version_tag: "v0.1.5".into(),
            title: "v0.1.5".into(),
            description: "Automated release".into(),
            is_draft: false,
            is_prerelease: false,
        }
    }

    #[test]
    fn upload_endpoint_strips_template() {
        let url = upload_endpoint(
            "https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}",
            "linux-amd64",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/o/r/releases/1/assets?name=linux-amd64"
        );
        assert!(upload_endpoint("not a url", "x").is_err());
    }

    #[tokio::test]
    async fn missing_token_fails_without_network() {
        let host = client("http://127.0.0.1:9", Some("   "));
        assert!(matches!(
            host.ensure_authenticated(),
            Err(ReleaseError::AuthenticationMissing { .. })
        ));
        let err = host.create_release(&descriptor()).await.unwrap_err();
        assert!(matches!(err, ReleaseError::AuthenticationMissing { ref variable } if variable == "GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn creates_release_and_streams_asset() {
        let (listener, base) = stub_base().await;
        let created = format!(
            r#"{{"id":42,"tag_name":"v0.1.5","html_url":"https://github.com/ethanhamilthon/leverans/releases/tag/v0.1.5","upload_url":"{base}/upload/releases/42/assets{{?name,label}}"}}"#
        );
        let server = spawn_stub(listener, vec![(201, created), (201, "{}".to_string())]);
        let host = client(&base, Some("t0ken"));

        let record = host.create_release(&descriptor()).await.unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.tag, "v0.1.5");

        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("linux-amd64");
        std::fs::write(&path, vec![7u8; 10_000]).unwrap();
        let artifact = BuildArtifact {
            output_name: "linux-amd64".into(),
            local_path: path,
            size_bytes: 10_000,
        };
        host.upload_asset(&record, &artifact).await.unwrap();

        let requests = server.await.unwrap();
        assert_eq!(
            requests[0].request_line,
            "POST /repos/ethanhamilthon/leverans/releases HTTP/1.1"
        );
        assert_eq!(requests[0].header("authorization"), Some("Bearer t0ken"));
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["tag_name"], "v0.1.5");
        assert_eq!(sent["name"], "v0.1.5");

        assert_eq!(
            requests[1].request_line,
            "POST /upload/releases/42/assets?name=linux-amd64 HTTP/1.1"
        );
        assert_eq!(
            requests[1].header("content-type"),
            Some("application/octet-stream")
        );
        assert_eq!(requests[1].body.len(), 10_000);
    }

    #[tokio::test]
    async fn duplicate_tag_is_release_create_failure() {
        let (listener, base) = stub_base().await;
        let rejected = r#"{"message":"Validation Failed","errors":[{"resource":"Release","code":"already_exists","field":"tag_name"}]}"#;
        let server = spawn_stub(listener, vec![(422, rejected.to_string())]);
        let host = client(&base, Some("t0ken"));

        let err = host.create_release(&descriptor()).await.unwrap_err();

        match err {
            ReleaseError::ReleaseCreateFailure { tag, reason } => {
                assert_eq!(tag, "v0.1.5");
                assert!(reason.contains("422"));
                assert!(reason.contains("already_exists"));
            }
            other => panic!("expected ReleaseCreateFailure, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn rejected_upload_is_upload_failure() {
        let (listener, base) = stub_base().await;
        let server = spawn_stub(
            listener,
            vec![(500, r#"{"message":"Server Error"}"#.to_string())],
        );
        let host = client(&base, Some("t0ken"));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macos-arm64");
        std::fs::write(&path, b"binary").unwrap();
        let record = ReleaseRecord {
            id: 1,
            tag: "v0.1.5".into(),
            html_url: String::new(),
            upload_url: format!("{base}/assets{{?name,label}}"),
        };
        let artifact = BuildArtifact {
            output_name: "macos-arm64".into(),
            local_path: path,
            size_bytes: 6,
        };

        let err = host.upload_asset(&record, &artifact).await.unwrap_err();

        assert!(matches!(err, ReleaseError::UploadFailure { ref asset, .. } if asset == "macos-arm64"));
        assert!(err.to_string().contains("Server Error"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreadable_artifact_is_upload_failure() {
        let host = client("http://127.0.0.1:9", Some("t0ken"));
        let record = ReleaseRecord {
            id: 1,
            tag: "v0.1.5".into(),
            html_url: String::new(),
            upload_url: "http://127.0.0.1:9/assets".into(),
        };
        let artifact = BuildArtifact {
            output_name: "windows-arm64".into(),
            local_path: PathBuf::from("/nonexistent/windows-arm64"),
            size_bytes: 0,
        };

        let err = host.upload_asset(&record, &artifact).await.unwrap_err();
        assert!(matches!(err, ReleaseError::UploadFailure { .. }));
    }
}
