//! Kubernetes-backed secret store

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use kube::api::{Api, PostParams};

use super::SecretStore;
use crate::error::{KubeError, Result};

/// Reads and replaces Secrets through the Kubernetes API
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    /// Create with an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the Secret API for a namespace
    fn secrets_api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret> {
        match self.secrets_api(namespace).get(name).await {
            Ok(secret) => Ok(secret),
            Err(kube::Error::Api(e)) if e.code == 404 => Err(KubeError::SecretNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, secret: &Secret) -> Result<()> {
        let name = secret
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| KubeError::InvalidSecret("secret has no name".to_string()))?;
        let namespace = secret
            .metadata
            .namespace
            .as_deref()
            .ok_or_else(|| KubeError::InvalidSecret("secret has no namespace".to_string()))?;

        match self
            .secrets_api(namespace)
            .replace(name, &PostParams::default(), secret)
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 409 => Err(KubeError::Conflict {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
