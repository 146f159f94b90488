//! Pull request labels

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::{ReleaseError, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Source of labels attached to a pull request
#[async_trait]
pub trait LabelSource: Send + Sync {
    async fn labels(&self, pr_number: u64) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct Issue {
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
struct Label {
    name: Option<String>,
}

/// Labels read from the GitHub REST issues endpoint
#[derive(Clone)]
pub struct GitHubLabels {
    client: reqwest::Client,
    api: Url,
    repository: String,
    token: Option<String>,
}

impl std::fmt::Debug for GitHubLabels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubLabels")
            .field("api", &self.api.as_str())
            .field("repository", &self.repository)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GitHubLabels {
    /// `repository` is the `owner/name` slug
    pub fn new(api_url: &str, repository: &str, token: Option<&str>) -> Result<Self> {
        let api = Url::parse(api_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("chartkit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api,
            repository: repository.to_string(),
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }

    fn issue_url(&self, pr_number: u64) -> Result<Url> {
        let mut url = self.api.clone();
        let number = pr_number.to_string();
        let mut segments = url.path_segments_mut().map_err(|_| ReleaseError::Network {
            message: format!("invalid API base URL: {}", self.api),
        })?;
        segments.pop_if_empty().push("repos");
        segments.extend(self.repository.split('/'));
        segments.push("issues").push(&number);
        drop(segments);
        Ok(url)
    }
}

#[async_trait]
impl LabelSource for GitHubLabels {
    async fn labels(&self, pr_number: u64) -> Result<Vec<String>> {
        let url = self.issue_url(pr_number)?;
        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::GitHub {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let issue: Issue = response.json().await?;
        Ok(issue.labels.into_iter().filter_map(|l| l.name).collect())
    }
}

/// In-memory label source for testing
#[derive(Clone, Default)]
pub struct StaticLabels {
    labels: HashMap<u64, Vec<String>>,
    failing: HashSet<u64>,
    lookups: Arc<RwLock<Vec<u64>>>,
}

impl StaticLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pr_number: u64, labels: &[&str]) -> Self {
        self.labels
            .insert(pr_number, labels.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Lookups for `pr_number` fail
    pub fn failing(mut self, pr_number: u64) -> Self {
        self.failing.insert(pr_number);
        self
    }

    /// PR numbers looked up so far, in order
    pub fn lookups(&self) -> Vec<u64> {
        self.lookups.read().unwrap().clone()
    }
}

#[async_trait]
impl LabelSource for StaticLabels {
    async fn labels(&self, pr_number: u64) -> Result<Vec<String>> {
        self.lookups.write().unwrap().push(pr_number);
        if self.failing.contains(&pr_number) {
            return Err(ReleaseError::GitHub {
                url: format!("static://{}", pr_number),
                status: 500,
            });
        }
        Ok(self.labels.get(&pr_number).cloned().unwrap_or_default())
    }
}
