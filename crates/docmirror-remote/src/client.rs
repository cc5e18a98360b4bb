//! GitHub-backed [`RemoteSource`].
//!
//! Uses two endpoints:
//!
//! ```text
//! {api_url}/repos/{repo}/git/trees/{branch}?recursive=1   # tree listing
//! {raw_url}/{repo}/{branch}/{path}                        # raw content
//! ```

use std::time::Duration;

use docmirror_manifest::TreeNode;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use ureq::Agent;
use ureq::http::Response;

use crate::RemoteSource;
use crate::error::FetchError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Largest raw file accepted (images included).
const MAX_RAW_SIZE: u64 = 32 * 1024 * 1024;

const USER_AGENT: &str = concat!("docmirror/", env!("CARGO_PKG_VERSION"));

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Connection settings for [`GithubClient`].
#[derive(Clone, Debug)]
pub struct GithubConfig {
    /// REST API base URL.
    pub api_url: String,
    /// Raw content base URL.
    pub raw_url: String,
    /// Branch to mirror.
    pub branch: String,
    /// Access credential sent as `Authorization: token ...`.
    pub access_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_owned(),
            raw_url: "https://raw.githubusercontent.com".to_owned(),
            branch: "master".to_owned(),
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
        }
    }
}

/// Tree listing response body.
#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeNode>,
    #[serde(default)]
    truncated: bool,
}

impl TreeResponse {
    /// Entries of a complete listing. A truncated listing is an error, since
    /// persisting it would drop every file past the cut.
    fn into_complete(self, repo: &str) -> Result<Vec<TreeNode>, FetchError> {
        if self.truncated {
            return Err(FetchError::Truncated {
                repo: repo.to_owned(),
                entries: self.tree.len(),
            });
        }
        Ok(self.tree)
    }
}

/// GitHub REST API client.
pub struct GithubClient {
    agent: Agent,
    api_url: String,
    raw_url: String,
    branch: String,
    access_token: Option<String>,
}

impl GithubClient {
    /// Create a client from connection settings.
    #[must_use]
    pub fn new(config: GithubConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            raw_url: config.raw_url.trim_end_matches('/').to_owned(),
            branch: config.branch,
            access_token: config.access_token.filter(|t| !t.is_empty()),
        }
    }

    /// Tree listing URL for a repository.
    fn tree_url(&self, repo: &str) -> String {
        format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_url,
            repo,
            encode_segment(&self.branch)
        )
    }

    /// Raw content URL for a file.
    fn raw_file_url(&self, repo: &str, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(encode_segment)
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}/{}",
            self.raw_url,
            repo,
            encode_segment(&self.branch),
            encoded
        )
    }

    /// Issue a GET request and return the response if its status is a success.
    fn get(&self, url: &str, accept: &str) -> Result<Response<ureq::Body>, FetchError> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", accept);
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", &format!("token {token}"));
        }

        let response = request.call()?;
        let status = response.status().as_u16();

        if status == 404 {
            return Err(FetchError::NotFound(url.to_owned()));
        }
        if status >= 400 {
            let error_body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(FetchError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(response)
    }
}

impl RemoteSource for GithubClient {
    fn fetch_tree(&self, repo: &str) -> Result<Vec<TreeNode>, FetchError> {
        let url = self.tree_url(repo);
        tracing::debug!(repo, "Fetching tree");

        let body = self
            .get(&url, "application/vnd.github+json")?
            .into_body()
            .read_to_string()?;
        let listing: TreeResponse = serde_json::from_str(&body)?;
        listing.into_complete(repo)
    }

    fn fetch_raw(&self, repo: &str, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.raw_file_url(repo, path);
        tracing::debug!(repo, path, "Fetching file");

        let mut body = self.get(&url, "*/*")?.into_body();
        body.with_config()
            .limit(MAX_RAW_SIZE)
            .read_to_vec()
            .map_err(|e| raw_body_error(path, e))
    }
}

fn raw_body_error(path: &str, error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::BodyExceedsLimit(limit) => FetchError::TooLarge {
            path: path.to_owned(),
            limit,
        },
        other => FetchError::HttpRequest(other),
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmirror_manifest::NodeKind;
    use pretty_assertions::assert_eq;

    fn client() -> GithubClient {
        GithubClient::new(GithubConfig {
            api_url: "https://api.example.com/".to_owned(),
            raw_url: "https://raw.example.com".to_owned(),
            ..GithubConfig::default()
        })
    }

    #[test]
    fn test_tree_url() {
        assert_eq!(
            client().tree_url("go-gitea/docs"),
            "https://api.example.com/repos/go-gitea/docs/git/trees/master?recursive=1"
        );
    }

    #[test]
    fn test_raw_file_url_encodes_segments() {
        assert_eq!(
            client().raw_file_url("go-gitea/docs", "en-US/getting started/intro.md"),
            "https://raw.example.com/go-gitea/docs/master/en-US/getting%20started/intro.md"
        );
    }

    #[test]
    fn test_raw_file_url_custom_branch() {
        let client = GithubClient::new(GithubConfig {
            branch: "main".to_owned(),
            ..GithubConfig::default()
        });
        assert_eq!(
            client.raw_file_url("o/r", "a.md"),
            "https://raw.githubusercontent.com/o/r/main/a.md"
        );
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = GithubClient::new(GithubConfig {
            access_token: Some(String::new()),
            ..GithubConfig::default()
        });
        assert!(client.access_token.is_none());
    }

    #[test]
    fn test_decode_tree_response() {
        let body = r#"{
            "sha": "9fb037999f264ba9a7fc6274d15fa3ae2ab98312",
            "url": "https://api.github.com/repos/o/r/trees/9fb0",
            "tree": [
                {"path": "en-US", "mode": "040000", "type": "tree", "sha": "t1"},
                {"path": "en-US/intro.md", "mode": "100644", "type": "blob", "sha": "b1", "size": 30}
            ],
            "truncated": false
        }"#;
        let listing: TreeResponse = serde_json::from_str(body).unwrap();

        assert!(!listing.truncated);
        assert_eq!(listing.tree.len(), 2);
        assert_eq!(listing.tree[0].kind, NodeKind::Tree);
        assert_eq!(listing.tree[1], TreeNode::blob("en-US/intro.md", "b1"));
    }

    #[test]
    fn test_truncated_tree_is_an_error() {
        let body = r#"{
            "tree": [{"path": "en-US/a.md", "type": "blob", "sha": "b1"}],
            "truncated": true
        }"#;
        let listing: TreeResponse = serde_json::from_str(body).unwrap();

        let err = listing.into_complete("o/r").unwrap_err();

        assert!(matches!(
            err,
            FetchError::Truncated { ref repo, entries: 1 } if repo == "o/r"
        ));
    }

    #[test]
    fn test_complete_tree_passes_through() {
        let body = r#"{"tree": [{"path": "en-US/a.md", "type": "blob", "sha": "b1"}]}"#;
        let listing: TreeResponse = serde_json::from_str(body).unwrap();

        let nodes = listing.into_complete("o/r").unwrap();

        assert_eq!(nodes, vec![TreeNode::blob("en-US/a.md", "b1")]);
    }

    #[test]
    fn test_oversized_body_maps_to_too_large() {
        let err = raw_body_error("en-US/images/big.png", ureq::Error::BodyExceedsLimit(1024));

        assert!(matches!(
            err,
            FetchError::TooLarge { ref path, limit: 1024 } if path == "en-US/images/big.png"
        ));
    }
}
