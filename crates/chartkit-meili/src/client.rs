//! HTTP client for the Meilisearch API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::engine::SearchEngine;
use crate::error::{MeiliError, Result};
use crate::types::{ApiKey, ErrorBody, Health, KeyCreate, KeyListing, Task, TaskInfo};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const KEYS_PAGE_SIZE: usize = 100;
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(200);
const TASK_POLL_ATTEMPTS: u32 = 50;

/// Meilisearch client authenticated with the master key
#[derive(Clone)]
pub struct MeiliClient {
    client: reqwest::Client,
    base: Url,
    master_key: Option<String>,
}

impl std::fmt::Debug for MeiliClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeiliClient")
            .field("base", &self.base.as_str())
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl MeiliClient {
    /// Create a client for `host` (e.g. `http://meilisearch:7700`)
    pub fn new(host: &str, master_key: Option<&str>) -> Result<Self> {
        let base = Url::parse(host.trim()).map_err(|e| MeiliError::InvalidUrl {
            url: host.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(MeiliError::InvalidUrl {
                url: host.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MeiliError::Network {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base,
            master_key: master_key.filter(|k| !k.is_empty()).map(str::to_string),
        })
    }

    pub fn host(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| MeiliError::InvalidUrl {
                url: self.base.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, key: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, url);
        match key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn master(&self) -> Option<&str> {
        self.master_key.as_deref()
    }

    async fn health_with(&self, key: Option<&str>) -> Result<Health> {
        let url = self.endpoint(&["health"])?;
        let response = self.request(Method::GET, url, key).send().await?;
        json(check(response).await?).await
    }

    async fn wait_for_task(&self, task_uid: u64) -> Result<Task> {
        let url = self.endpoint(&["tasks", &task_uid.to_string()])?;
        for _ in 0..TASK_POLL_ATTEMPTS {
            let response = self
                .request(Method::GET, url.clone(), self.master())
                .send()
                .await?;
            let task: Task = json(check(response).await?).await?;
            if matches!(task.status.as_str(), "succeeded" | "failed" | "canceled") {
                return Ok(task);
            }
            tokio::time::sleep(TASK_POLL_INTERVAL).await;
        }
        Err(MeiliError::TaskFailed {
            task_uid,
            message: "task still pending".to_string(),
        })
    }
}

/// Turn non-success responses into [`MeiliError::Api`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error: ErrorBody = serde_json::from_str(&body).unwrap_or_else(|_| ErrorBody {
        message: body.trim().to_string(),
        code: String::new(),
    });
    Err(MeiliError::Api {
        status: status.as_u16(),
        code: error.code,
        message: error.message,
    })
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl SearchEngine for MeiliClient {
    async fn health(&self) -> Result<Health> {
        self.health_with(self.master()).await
    }

    async fn key_health(&self, key: &str) -> Result<Health> {
        self.health_with(Some(key)).await
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>> {
        let mut keys = Vec::new();
        let mut offset = 0;
        loop {
            let mut url = self.endpoint(&["keys"])?;
            url.query_pairs_mut()
                .append_pair("limit", &KEYS_PAGE_SIZE.to_string())
                .append_pair("offset", &offset.to_string());

            let response = self.request(Method::GET, url, self.master()).send().await?;
            match json::<KeyListing>(check(response).await?).await? {
                KeyListing::Plain(page) => {
                    keys.extend(page);
                    return Ok(keys);
                }
                KeyListing::Page { results, total } => {
                    let fetched = results.len();
                    keys.extend(results);
                    offset += fetched;
                    let done = match total {
                        Some(total) => offset >= total,
                        None => fetched < KEYS_PAGE_SIZE,
                    };
                    if done || fetched == 0 {
                        return Ok(keys);
                    }
                }
            }
        }
    }

    async fn get_key(&self, key: &str) -> Result<Option<ApiKey>> {
        let url = self.endpoint(&["keys", key])?;
        let response = self.request(Method::GET, url, self.master()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(json(check(response).await?).await?))
    }

    async fn create_key(&self, request: &KeyCreate) -> Result<ApiKey> {
        let url = self.endpoint(&["keys"])?;
        let response = self
            .request(Method::POST, url, self.master())
            .json(request)
            .send()
            .await?;
        json(check(response).await?).await
    }

    async fn index_exists(&self, uid: &str) -> Result<bool> {
        let url = self.endpoint(&["indexes", uid])?;
        let response = self.request(Method::GET, url, self.master()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(response).await?;
        Ok(true)
    }

    async fn create_index(&self, uid: &str) -> Result<()> {
        let url = self.endpoint(&["indexes"])?;
        let response = self
            .request(Method::POST, url, self.master())
            .json(&serde_json::json!({ "uid": uid }))
            .send()
            .await?;
        let info: TaskInfo = json(check(response).await?).await?;

        let task = self.wait_for_task(info.task_uid).await?;
        match (task.status.as_str(), task.error) {
            ("succeeded", _) => Ok(()),
            (_, Some(error)) if error.code == "index_already_exists" => Ok(()),
            (status, error) => Err(MeiliError::TaskFailed {
                task_uid: info.task_uid,
                message: error.map(|e| e.message).unwrap_or_else(|| status.to_string()),
            }),
        }
    }
}
