//! In-memory secret store for testing
//!
//! Stores secrets by namespace and name, useful for unit tests
//! without requiring a Kubernetes cluster.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::SecretStore;
use crate::error::{KubeError, Result};

/// In-memory secret store for testing
#[derive(Clone, Default)]
pub struct MockSecretStore {
    /// Storage: (namespace, name) -> secret
    store: Arc<RwLock<HashMap<(String, String), Secret>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone)]
pub struct OperationCounts {
    pub gets: usize,
    pub replaces: usize,
}

impl MockSecretStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated secrets
    pub fn with_secrets(secrets: Vec<Secret>) -> Self {
        let store = Self::new();
        for secret in secrets {
            store.insert(secret);
        }
        store
    }

    /// Insert or overwrite a secret without counting an operation
    pub fn insert(&self, secret: Secret) {
        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        self.store.write().unwrap().insert(key, secret);
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.operations.write().unwrap().gets += 1;

        self.store
            .read()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| KubeError::SecretNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    async fn replace(&self, secret: &Secret) -> Result<()> {
        self.operations.write().unwrap().replaces += 1;

        let key = (
            secret.metadata.namespace.clone().unwrap_or_default(),
            secret.metadata.name.clone().unwrap_or_default(),
        );
        let mut store = self.store.write().unwrap();
        if !store.contains_key(&key) {
            return Err(KubeError::SecretNotFound {
                name: key.1,
                namespace: key.0,
            });
        }
        store.insert(key, secret.clone());
        Ok(())
    }
}
