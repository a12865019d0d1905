//! Request and response bodies of the GitHub releases API.

use serde::{Deserialize, Serialize};

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Serialize)]
pub struct CreateReleaseRequest<'a> {
    pub tag_name: &'a str,
    pub name: &'a str,
    pub body: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

/// The fields of a release response the pipeline uses
#[derive(Debug, Deserialize)]
pub struct ReleaseResponse {
    pub id: u64,
    pub tag_name: String,
    pub html_url: String,
    pub upload_url: String,
}

/// GitHub error body, e.g. `{"message": "Validation Failed", "errors": [...]}`
#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: Option<String>,
    pub field: Option<String>,
    pub message: Option<String>,
}

impl ApiError {
    /// Readable summary of an error body; falls back to the raw text.
    pub fn describe(body: &str) -> String {
        let Ok(error) = serde_json::from_str::<ApiError>(body) else {
            return body.trim().to_string();
        };

        let details: Vec<String> = error
            .errors
            .iter()
            .map(|d| match (&d.field, &d.code, &d.message) {
                (_, _, Some(message)) => message.clone(),
                (Some(field), Some(code), None) => format!("{field} {code}"),
                (None, Some(code), None) => code.clone(),
                _ => String::new(),
            })
            .filter(|d| !d.is_empty())
            .collect();

        if details.is_empty() {
            error.message
        } else {
            format!("{} ({})", error.message, details.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tag_error_is_summarized() {
        let body = r#"{"message":"Validation Failed","errors":[{"resource":"Release","code":"already_exists","field":"tag_name"}],"documentation_url":"https://docs.github.com"}"#;
        assert_eq!(
            ApiError::describe(body),
            "Validation Failed (tag_name already_exists)"
        );
    }

    #[test]
    fn plain_message_and_non_json_bodies() {
        assert_eq!(ApiError::describe(r#"{"message":"Bad credentials"}"#), "Bad credentials");
        assert_eq!(ApiError::describe("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn request_serializes_api_field_names() {
        let request = CreateReleaseRequest {
            tag_name: "v0.1.5",
            name: "v0.1.5",
            body: "Automated release",
            draft: false,
            prerelease: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tag_name"], "v0.1.5");
        assert_eq!(json["name"], "v0.1.5");
        assert_eq!(json["body"], "Automated release");
        assert_eq!(json["draft"], false);
        assert_eq!(json["prerelease"], false);
    }
}
