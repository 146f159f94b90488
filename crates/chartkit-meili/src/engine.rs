//! Search engine abstraction

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ApiKey, Health, KeyCreate};

/// Operations the provisioner performs against Meilisearch
///
/// All calls except [`SearchEngine::key_health`] authenticate with the
/// master credential. Implementations must be Send + Sync for use across
/// async tasks.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// `GET /health` with the master credential
    async fn health(&self) -> Result<Health>;

    /// `GET /health` authenticated with `key` instead of the master credential
    async fn key_health(&self, key: &str) -> Result<Health>;

    /// Every key visible to the master credential
    async fn list_keys(&self) -> Result<Vec<ApiKey>>;

    /// Look up a key by value or uid; `None` when the server does not know it
    async fn get_key(&self, key: &str) -> Result<Option<ApiKey>>;

    /// Create a key and return it with its generated value
    async fn create_key(&self, request: &KeyCreate) -> Result<ApiKey>;

    /// Whether an index exists
    async fn index_exists(&self, uid: &str) -> Result<bool>;

    /// Create an index and wait for the creation task to settle
    async fn create_index(&self, uid: &str) -> Result<()>;
}
