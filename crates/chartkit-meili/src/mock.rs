//! In-memory search engine for testing

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::engine::SearchEngine;
use crate::error::{MeiliError, Result};
use crate::types::{ApiKey, Health, KeyCreate, Scope};

/// In-memory [`SearchEngine`] for testing
#[derive(Clone, Default)]
pub struct MockSearchEngine {
    state: Arc<RwLock<MockState>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<EngineCounts>>,
}

#[derive(Default)]
struct MockState {
    keys: Vec<ApiKey>,
    indexes: BTreeSet<String>,
    /// Health checks that fail before the server comes up
    unavailable_checks: u32,
    invalid_master: bool,
    listing_fails: bool,
    creates_fail: bool,
    created: usize,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineCounts {
    pub health_checks: usize,
    pub key_health_checks: usize,
    pub key_lists: usize,
    pub key_lookups: usize,
    pub key_creates: usize,
    pub index_lookups: usize,
    pub index_creates: usize,
}

impl MockSearchEngine {
    /// Create a new empty, healthy engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated keys
    pub fn with_keys(keys: Vec<ApiKey>) -> Self {
        let engine = Self::new();
        engine.state.write().unwrap().keys = keys;
        engine
    }

    /// Pre-populate indexes
    pub fn with_indexes<I, S>(self, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .write()
            .unwrap()
            .indexes
            .extend(indexes.into_iter().map(Into::into));
        self
    }

    /// Fail the first `checks` health calls with a connection error
    pub fn unavailable_for(self, checks: u32) -> Self {
        self.state.write().unwrap().unavailable_checks = checks;
        self
    }

    /// Reject the master credential on authenticated endpoints
    pub fn with_invalid_master(self) -> Self {
        self.state.write().unwrap().invalid_master = true;
        self
    }

    /// Fail `list_keys` with a server error
    pub fn with_failing_listing(self) -> Self {
        self.state.write().unwrap().listing_fails = true;
        self
    }

    /// Fail `create_key` with a server error
    pub fn with_failing_creates(self) -> Self {
        self.state.write().unwrap().creates_fail = true;
        self
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> EngineCounts {
        self.operations.read().unwrap().clone()
    }

    /// All keys currently known (for testing)
    pub fn keys(&self) -> Vec<ApiKey> {
        self.state.read().unwrap().keys.clone()
    }

    /// All indexes currently known (for testing)
    pub fn indexes(&self) -> BTreeSet<String> {
        self.state.read().unwrap().indexes.clone()
    }

    fn record(&self, f: impl FnOnce(&mut EngineCounts)) {
        f(&mut self.operations.write().unwrap());
    }

    fn authorize(&self) -> Result<()> {
        if self.state.read().unwrap().invalid_master {
            return Err(MeiliError::Api {
                status: 403,
                code: "invalid_api_key".to_string(),
                message: "The provided API key is invalid.".to_string(),
            });
        }
        Ok(())
    }

    fn health_check(&self) -> Result<Health> {
        let mut state = self.state.write().unwrap();
        if state.unavailable_checks > 0 {
            state.unavailable_checks -= 1;
            return Err(MeiliError::Network {
                message: "Connection failed: connection refused".to_string(),
            });
        }
        Ok(Health {
            status: "available".to_string(),
        })
    }
}

fn internal_error(message: &str) -> MeiliError {
    MeiliError::Api {
        status: 500,
        code: "internal".to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl SearchEngine for MockSearchEngine {
    async fn health(&self) -> Result<Health> {
        self.record(|c| c.health_checks += 1);
        self.health_check()
    }

    async fn key_health(&self, _key: &str) -> Result<Health> {
        self.record(|c| c.key_health_checks += 1);
        self.health_check()
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>> {
        self.record(|c| c.key_lists += 1);
        self.authorize()?;
        let state = self.state.read().unwrap();
        if state.listing_fails {
            return Err(internal_error("listing failed"));
        }
        Ok(state.keys.clone())
    }

    async fn get_key(&self, key: &str) -> Result<Option<ApiKey>> {
        self.record(|c| c.key_lookups += 1);
        self.authorize()?;
        let state = self.state.read().unwrap();
        Ok(state
            .keys
            .iter()
            .find(|k| k.value() == Some(key) || k.uid.as_deref() == Some(key))
            .cloned())
    }

    async fn create_key(&self, request: &KeyCreate) -> Result<ApiKey> {
        self.record(|c| c.key_creates += 1);
        self.authorize()?;
        let mut state = self.state.write().unwrap();
        if state.creates_fail {
            return Err(internal_error("key creation failed"));
        }
        state.created += 1;
        let key = ApiKey {
            uid: Some(format!("mock-uid-{}", state.created)),
            key: Some(format!("mock-key-{}", state.created)),
            name: Some(request.name.clone()),
            description: Some(request.description.clone()),
            actions: Scope::from_items(&request.actions),
            indexes: Scope::from_items(&request.indexes),
            expires_at: None,
        };
        state.keys.push(key.clone());
        Ok(key)
    }

    async fn index_exists(&self, uid: &str) -> Result<bool> {
        self.record(|c| c.index_lookups += 1);
        self.authorize()?;
        Ok(self.state.read().unwrap().indexes.contains(uid))
    }

    async fn create_index(&self, uid: &str) -> Result<()> {
        self.record(|c| c.index_creates += 1);
        self.authorize()?;
        self.state.write().unwrap().indexes.insert(uid.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_then_healthy() {
        let engine = MockSearchEngine::new().unavailable_for(2);
        assert!(engine.health().await.is_err());
        assert!(engine.health().await.is_err());
        assert!(engine.health().await.unwrap().is_available());
        assert_eq!(engine.operation_counts().health_checks, 3);
    }

    #[tokio::test]
    async fn test_created_keys_are_listed_and_found() {
        let engine = MockSearchEngine::new();
        let created = engine
            .create_key(&KeyCreate {
                name: "n".into(),
                description: "d".into(),
                actions: vec!["*".into()],
                indexes: vec!["movies".into()],
                expires_at: None,
            })
            .await
            .unwrap();

        let value = created.value().unwrap();
        assert_eq!(engine.list_keys().await.unwrap().len(), 1);
        let found = engine.get_key(value).await.unwrap().unwrap();
        assert_eq!(found.actions, Scope::All);
    }

    #[tokio::test]
    async fn test_invalid_master_rejected() {
        let engine = MockSearchEngine::new().with_invalid_master();
        assert!(matches!(
            engine.list_keys().await,
            Err(MeiliError::Api { status: 403, .. })
        ));
        // Health is public
        assert!(engine.health().await.is_ok());
    }
}
