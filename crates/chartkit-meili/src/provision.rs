//! Provisioning flow
//!
//! On success the target secret's `api-key` field holds a key that is live
//! and grants at least the requested indexes and actions. The key is taken
//! from, in order: the explicitly supplied key, the secret itself, an
//! existing key found by the matcher, or a freshly created one.

use std::time::Duration;

use chartkit_kube::{API_KEY_FIELD, PatchReport, SecretStore, patch_field, read_api_key};

use crate::engine::SearchEngine;
use crate::error::{MeiliError, Result};
use crate::indexes::{IndexReport, ensure_indexes};
use crate::keys::{create_api_key, find_matching_key, redact, validate_api_key};
use crate::types::{KeyRequest, Scope};

/// Readiness polling: fixed delay, bounded attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay: Duration::from_secs(2),
        }
    }
}

/// Provisioner settings
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub host: String,
    pub master_key: String,
    /// Key supplied by the operator; kept if still valid
    pub supplied_key: Option<String>,
    pub namespace: String,
    pub secret_name: String,
    pub description: String,
    pub indexes: Scope,
    pub actions: Scope,
    pub dry_run: bool,
    pub retry: RetryPolicy,
}

impl ProvisionConfig {
    /// Defaults for everything but the endpoint and credential
    pub fn new(host: impl Into<String>, master_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            master_key: master_key.into(),
            supplied_key: None,
            namespace: "default".to_string(),
            secret_name: "meilisearch-api-key".to_string(),
            description: "Provisioned API Key".to_string(),
            indexes: Scope::All,
            actions: Scope::All,
            dry_run: false,
            retry: RetryPolicy::default(),
        }
    }

    /// Name given to created keys, unique per target secret
    pub fn key_name(&self) -> String {
        format!("{} ({}/{})", self.description, self.namespace, self.secret_name)
    }

    pub fn key_request(&self) -> KeyRequest {
        KeyRequest {
            description: self.description.clone(),
            name: self.key_name(),
            indexes: self.indexes.clone(),
            actions: self.actions.clone(),
        }
    }

    /// Reject settings that can never produce a usable key
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(MeiliError::InvalidConfig {
                message: message.to_string(),
            })
        };
        if self.master_key.trim().is_empty() {
            return invalid("master key is empty");
        }
        if self.namespace.trim().is_empty() || self.secret_name.trim().is_empty() {
            return invalid("namespace and secret name are required");
        }
        if self.indexes.is_empty() {
            return invalid("no indexes requested (use '*' for all)");
        }
        if self.actions.is_empty() {
            return invalid("no actions requested (use '*' for all)");
        }
        if self.retry.max_attempts == 0 {
            return invalid("at least one readiness attempt is required");
        }
        Ok(())
    }
}

/// Where the installed key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Supplied,
    Secret,
    Reused,
    Created,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Supplied => write!(f, "supplied"),
            KeySource::Secret => write!(f, "secret"),
            KeySource::Reused => write!(f, "reused"),
            KeySource::Created => write!(f, "created"),
        }
    }
}

/// Result of a provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub source: KeySource,
    /// Installed key value
    pub key: String,
    /// Secret update, when one was attempted
    pub patch: Option<PatchReport>,
    pub indexes: IndexReport,
}

impl ProvisionOutcome {
    /// Whether the secret was written (or would have been under dry-run)
    pub fn secret_changed(&self) -> bool {
        self.patch
            .as_ref()
            .is_some_and(|p| p.change != chartkit_kube::FieldChange::Unchanged)
    }
}

/// Poll health until the server reports `available`
pub async fn wait_until_ready(engine: &dyn SearchEngine, policy: &RetryPolicy) -> Result<()> {
    for attempt in 1..=policy.max_attempts {
        match engine.health().await {
            Ok(health) if health.is_available() => {
                tracing::info!("Meilisearch is available");
                return Ok(());
            }
            Ok(health) => tracing::info!(
                "Waiting for Meilisearch ({}/{}): status {}",
                attempt,
                policy.max_attempts,
                health.status
            ),
            Err(e) => tracing::info!(
                "Waiting for Meilisearch ({}/{}): {}",
                attempt,
                policy.max_attempts,
                e
            ),
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }
    Err(MeiliError::NotReady {
        attempts: policy.max_attempts,
    })
}

/// The master credential must see a healthy server and list keys
pub async fn validate_master_key(engine: &dyn SearchEngine) -> Result<()> {
    let health = engine
        .health()
        .await
        .map_err(|e| MeiliError::MasterKeyInvalid {
            message: e.to_string(),
        })?;
    if !health.is_available() {
        return Err(MeiliError::MasterKeyInvalid {
            message: format!("server status is '{}'", health.status),
        });
    }
    engine
        .list_keys()
        .await
        .map_err(|e| MeiliError::MasterKeyInvalid {
            message: e.to_string(),
        })?;
    tracing::info!("Master key is valid");
    Ok(())
}

/// Runs the provisioning flow against an engine and a secret store
pub struct Provisioner<'a> {
    engine: &'a dyn SearchEngine,
    secrets: &'a dyn SecretStore,
    config: &'a ProvisionConfig,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        engine: &'a dyn SearchEngine,
        secrets: &'a dyn SecretStore,
        config: &'a ProvisionConfig,
    ) -> Self {
        Self {
            engine,
            secrets,
            config,
        }
    }

    /// Validates the configuration itself before touching the engine
    pub async fn run(&self) -> Result<ProvisionOutcome> {
        self.config.validate()?;
        wait_until_ready(self.engine, &self.config.retry).await?;
        validate_master_key(self.engine).await?;

        let indexes = ensure_indexes(self.engine, &self.config.indexes).await;
        let outcome = |source, key: String, patch| ProvisionOutcome {
            source,
            key,
            patch,
            indexes: indexes.clone(),
        };

        if let Some(key) = self.config.supplied_key.as_deref().filter(|k| !k.is_empty()) {
            if validate_api_key(self.engine, key).await {
                tracing::info!("Supplied API key is valid, nothing to do");
                return Ok(outcome(KeySource::Supplied, key.to_string(), None));
            }
            tracing::warn!("Supplied API key {} is not valid", redact(key));
        }

        let stored = read_api_key(
            self.secrets,
            &self.config.namespace,
            &self.config.secret_name,
        )
        .await;
        if let Some(key) = stored {
            if validate_api_key(self.engine, &key).await {
                tracing::info!(
                    "API key in secret {}/{} is valid, nothing to do",
                    self.config.namespace,
                    self.config.secret_name
                );
                return Ok(outcome(KeySource::Secret, key, None));
            }
            tracing::warn!("API key stored in secret is not valid");
        }

        let request = self.config.key_request();
        if let Some(key) = find_matching_key(self.engine, &request).await {
            match self.store(&key).await {
                Ok(report) => return Ok(outcome(KeySource::Reused, key, Some(report))),
                Err(e) => tracing::warn!("Could not store reused key, creating a new one: {}", e),
            }
        }

        tracing::info!("Creating API key '{}'", request.name);
        let key = create_api_key(self.engine, &request).await?;
        let report = self.store(&key).await?;
        Ok(outcome(KeySource::Created, key, Some(report)))
    }

    async fn store(&self, key: &str) -> Result<PatchReport> {
        Ok(patch_field(
            self.secrets,
            &self.config.namespace,
            &self.config.secret_name,
            API_KEY_FIELD,
            key,
            self.config.dry_run,
        )
        .await?)
    }
}
