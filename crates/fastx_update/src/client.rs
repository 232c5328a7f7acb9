//! HTTP client for the GitHub releases index.

use crate::error::UpdateError;
use crate::types::Release;

/// HTTP client for a GitHub-style releases index. Styled after
/// `polaris_model_providers::anthropic::AnthropicClient`.
#[derive(Clone)]
pub struct ReleaseIndexClient {
    client: reqwest::Client,
    base_url: String,
    repo: String,
}

impl ReleaseIndexClient {
    /// Creates a client for `repo` (`owner/name`) against the default
    /// GitHub API host.
    #[must_use]
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://api.github.com".to_string(),
            repo: repo.into(),
        }
    }

    /// Creates a client against a custom host instead of `api.github.com`.
    /// Used to point the release index at a self-hosted mirror, or at a
    /// local responder in tests.
    #[must_use]
    pub fn with_base_url(repo: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            repo: repo.into(),
        }
    }

    /// Fetches the single latest release.
    pub async fn latest_release(&self) -> Result<Release, UpdateError> {
        let url = format!("{}/repos/{}/releases/latest", self.base_url, self.repo);
        self.get_release(&url).await
    }

    /// Fetches up to `per_page` releases, newest first.
    pub async fn list_releases(&self, per_page: u32) -> Result<Vec<Release>, UpdateError> {
        let url = format!(
            "{}/repos/{}/releases?per_page={per_page}",
            self.base_url, self.repo
        );
        let response = self
            .client
            .get(&url)
            .header("User-Agent", "fastx-tui")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpdateError::MalformedResponse(format!(
                "release index returned {status}: {body}"
            )));
        }

        serde_json::from_str(&body)
            .map_err(|err| UpdateError::MalformedResponse(format!("{err}: {body}")))
    }

    async fn get_release(&self, url: &str) -> Result<Release, UpdateError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "fastx-tui")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpdateError::MalformedResponse(format!(
                "release index returned {status}: {body}"
            )));
        }

        serde_json::from_str(&body)
            .map_err(|err| UpdateError::MalformedResponse(format!("{err}: {body}")))
    }
}

impl core::fmt::Debug for ReleaseIndexClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReleaseIndexClient")
            .field("base_url", &self.base_url)
            .field("repo", &self.repo)
            .finish()
    }
}
