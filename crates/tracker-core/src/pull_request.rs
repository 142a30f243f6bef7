//! Merged pull request lookup
//!
//! GitHub does not index pull requests by merge commit, so the resolver scans
//! the most recently updated closed pull requests (one page of
//! [`PULL_REQUEST_WINDOW`]) and matches on `merge_commit_sha`. Merges older
//! than that window resolve as [`PullRequestLookup::NotFound`].

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::RepoRef;
use crate::error::{Result, TrackerError};

/// Number of closed pull requests scanned per lookup.
pub const PULL_REQUEST_WINDOW: u32 = 100;

const DEFAULT_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Pull request that produced the run's commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub title: String,
    pub body: Option<String>,
    pub number: u64,
    pub url: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
}

/// Outcome of a pull request lookup. `NotFound` is a normal result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullRequestLookup {
    Found(PullRequestRef),
    NotFound,
}

impl PullRequestLookup {
    /// Pull request URL, or `""` when there is no association.
    pub fn link(&self) -> &str {
        match self {
            PullRequestLookup::Found(pr) => &pr.url,
            PullRequestLookup::NotFound => "",
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PullRequestLookup::Found(_))
    }
}

/// GitHub REST API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubApiConfig {
    /// API base URL (differs on GitHub Enterprise Server)
    pub api_url: String,
    pub user_agent: String,
}

impl Default for GithubApiConfig {
    fn default() -> Self {
        GithubApiConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .ok()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            user_agent: crate::USER_AGENT.to_string(),
        }
    }
}

impl GithubApiConfig {
    pub fn new(api_url: &str) -> Self {
        GithubApiConfig {
            api_url: api_url.to_string(),
            user_agent: crate::USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }
}

#[derive(Debug, Deserialize)]
struct GithubLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GithubPull {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    merge_commit_sha: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    labels: Vec<GithubLabel>,
    #[serde(default)]
    assignees: Option<Vec<GithubUser>>,
}

impl From<GithubPull> for PullRequestRef {
    fn from(pull: GithubPull) -> Self {
        PullRequestRef {
            title: pull.title,
            body: pull.body,
            number: pull.number,
            url: pull.html_url,
            labels: pull.labels.into_iter().map(|l| l.name).collect(),
            assignees: pull
                .assignees
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.login)
                .collect(),
        }
    }
}

/// Authenticated GitHub REST client for pull request listing.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubApiConfig, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| TrackerError::InvalidHeader(format!("user agent: {e}")))?,
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| TrackerError::InvalidHeader(format!("authorization: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(GithubClient {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Most recently updated closed pull requests, newest first.
    async fn list_closed_pulls(&self, repo: &RepoRef) -> Result<Vec<GithubPull>> {
        let url = format!("{}/repos/{}/{}/pulls", self.api_url, repo.owner, repo.name);
        let per_page = PULL_REQUEST_WINDOW.to_string();

        let response = self
            .http
            .get(&url)
            .query(&[
                ("state", "closed"),
                ("sort", "updated"),
                ("direction", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::GithubApi {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Finds the merged pull request whose merge commit is the run's commit.
#[derive(Debug, Clone, Default)]
pub struct PullRequestResolver {
    config: GithubApiConfig,
}

impl PullRequestResolver {
    pub fn new(config: GithubApiConfig) -> Self {
        PullRequestResolver { config }
    }

    /// Resolve the pull request merged as `sha`.
    ///
    /// Without a token no request is made and the result is `NotFound`.
    /// API and network failures propagate.
    pub async fn resolve(
        &self,
        token: Option<&str>,
        repo: &RepoRef,
        sha: &str,
    ) -> Result<PullRequestLookup> {
        let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                debug!("no GitHub token, skipping pull request lookup");
                return Ok(PullRequestLookup::NotFound);
            }
        };

        let client = GithubClient::new(&self.config, token)?;
        let pulls = client.list_closed_pulls(repo).await?;
        debug!(repository = %repo, scanned = pulls.len(), "listed closed pull requests");

        let found = pulls
            .into_iter()
            .find(|p| p.merge_commit_sha.as_deref() == Some(sha));

        Ok(match found {
            Some(pull) => {
                debug!(
                    number = pull.number,
                    updated_at = ?pull.updated_at,
                    "matched merge commit"
                );
                PullRequestLookup::Found(pull.into())
            }
            None => PullRequestLookup::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_link() {
        assert_eq!(PullRequestLookup::NotFound.link(), "");
        let pr = PullRequestRef {
            title: "Add cache".to_string(),
            body: None,
            number: 7,
            url: "https://github.com/o/r/pull/7".to_string(),
            labels: vec![],
            assignees: vec![],
        };
        let lookup = PullRequestLookup::Found(pr);
        assert!(lookup.is_found());
        assert_eq!(lookup.link(), "https://github.com/o/r/pull/7");
    }

    #[test]
    fn test_pull_projection() {
        let pull: GithubPull = serde_json::from_value(json!({
            "number": 12,
            "title": "Fix login",
            "body": null,
            "html_url": "https://github.com/o/r/pull/12",
            "merge_commit_sha": "abc",
            "updated_at": "2024-05-01T10:00:00Z",
            "labels": [{"name": "bug"}, {"name": "prio"}],
            "assignees": [{"login": "alice"}]
        }))
        .unwrap();

        let pr = PullRequestRef::from(pull);
        assert_eq!(pr.number, 12);
        assert_eq!(pr.body, None);
        assert_eq!(pr.labels, vec!["bug", "prio"]);
        assert_eq!(pr.assignees, vec!["alice"]);
    }

    #[test]
    fn test_pull_missing_arrays() {
        let pull: GithubPull = serde_json::from_value(json!({
            "number": 3,
            "title": "t",
            "body": "b",
            "html_url": "u",
            "merge_commit_sha": null,
            "assignees": null
        }))
        .unwrap();

        let pr = PullRequestRef::from(pull);
        assert!(pr.labels.is_empty());
        assert!(pr.assignees.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = GithubApiConfig::new("https://ghe.example.com/api/v3").with_user_agent("x/1");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.user_agent, "x/1");
    }

    #[tokio::test]
    async fn test_no_token_is_not_found() {
        // Unroutable API URL: any request would fail the test.
        let resolver = PullRequestResolver::new(GithubApiConfig::new("http://127.0.0.1:1"));
        let repo = RepoRef::new("o", "r");

        let lookup = resolver.resolve(None, &repo, "abc").await.unwrap();
        assert_eq!(lookup, PullRequestLookup::NotFound);

        let lookup = resolver.resolve(Some("  "), &repo, "abc").await.unwrap();
        assert_eq!(lookup, PullRequestLookup::NotFound);
    }
}
