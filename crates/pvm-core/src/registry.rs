use async_trait::async_trait;
use log::{debug, info, warn};
use pvm_types::{PvmError, ReleaseSource, strip_tag_prefix};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com/repos/pulumi/pulumi";

const PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Client for the GitHub releases API of the managed tool.
#[derive(Clone)]
pub struct GitHubRegistry {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubRegistry {
    #[must_use]
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Authenticate registry requests, which raises the API rate limit.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.is_empty());
        self
    }

    async fn get(
        &self,
        operation: &'static str,
        url: &str,
    ) -> Result<reqwest::Response, PvmError> {
        debug!("GET {url}");
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|error| PvmError::network_request(operation, error))?;

        let status = response.status();
        if !status.is_success() {
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, 160))
                .unwrap_or_default();
            warn!("Registry returned {status} for {url}");
            return Err(PvmError::network_status(
                operation,
                format!("HTTP {status}{body_snippet}"),
            ));
        }

        Ok(response)
    }

    async fn fetch_page(&self, page: u32) -> Result<(Vec<Release>, bool), PvmError> {
        let url = format!(
            "{}/releases?page={page}&per_page={PER_PAGE}",
            self.api_url
        );
        let response = self.get("fetch releases", &url).await?;
        let has_next = has_next_page(response.headers());
        let body = response
            .text()
            .await
            .map_err(|error| PvmError::network_body("fetch releases", error))?;
        let releases = serde_json::from_str(&body)
            .map_err(|error| PvmError::decode("release list", error))?;
        Ok((releases, has_next))
    }
}

#[async_trait]
impl ReleaseSource for GitHubRegistry {
    async fn fetch_releases(&self) -> Result<Vec<String>, PvmError> {
        let mut versions = Vec::new();
        let mut page = 1;

        loop {
            let (releases, has_next) = self.fetch_page(page).await?;
            if releases.is_empty() {
                break;
            }

            versions.extend(
                releases
                    .iter()
                    .map(|release| strip_tag_prefix(&release.tag_name).to_string()),
            );

            if !has_next {
                break;
            }
            page += 1;
        }

        info!("Fetched {} releases across {page} page(s)", versions.len());
        Ok(versions)
    }

    async fn fetch_latest(&self) -> Result<String, PvmError> {
        let url = format!("{}/releases/latest", self.api_url);
        let response = self.get("fetch latest release", &url).await?;
        let body = response
            .text()
            .await
            .map_err(|error| PvmError::network_body("fetch latest release", error))?;
        let release: Release = serde_json::from_str(&body)
            .map_err(|error| PvmError::decode("latest release", error))?;

        let version = strip_tag_prefix(&release.tag_name).to_string();
        debug!("Latest release is {version}");
        Ok(version)
    }
}

fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains(r#"rel="next""#))
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}
