//! Secret field storage
//!
//! The provisioner keeps exactly one value per Secret: the `api-key` field.
//! Reads never fail (any problem reads as "absent"); patches are a
//! read-modify-write of the whole object so the fetched `resourceVersion`
//! guards against concurrent writers.

mod cluster;
mod mock;

pub use cluster::KubeSecretStore;
pub use mock::{MockSecretStore, OperationCounts};

use async_trait::async_trait;
use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1::Secret;

use crate::error::Result;

/// Field holding the provisioned key
pub const API_KEY_FIELD: &str = "api-key";

/// Older manifests used an underscore
const LEGACY_API_KEY_FIELD: &str = "api_key";

/// Secret access used by the provisioner
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret>;

    /// Replace a previously fetched secret (namespace and name come from its metadata)
    async fn replace(&self, secret: &Secret) -> Result<()>;
}

/// How a patch changes the target field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    /// Field did not exist
    Created,
    /// Field existed with a different value
    Updated,
    /// Field already held the value
    Unchanged,
}

/// Result of [`patch_field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub namespace: String,
    pub name: String,
    pub field: String,
    pub change: FieldChange,
    /// Whether the update was sent to the store
    pub written: bool,
    pub dry_run: bool,
}

impl std::fmt::Display for PatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.change {
            FieldChange::Created => "create",
            FieldChange::Updated => "overwrite",
            FieldChange::Unchanged => "leave unchanged",
        };
        let prefix = if self.dry_run { "would " } else { "" };
        write!(
            f,
            "{}{} field '{}' of secret {}/{}",
            prefix, verb, self.field, self.namespace, self.name
        )
    }
}

/// Decoded value of `field`, or `None` on any failure
pub async fn read_field(
    store: &dyn SecretStore,
    namespace: &str,
    name: &str,
    field: &str,
) -> Option<String> {
    let secret = match store.get(namespace, name).await {
        Ok(secret) => secret,
        Err(e) => {
            tracing::debug!(namespace, name, error = %e, "could not read secret");
            return None;
        }
    };
    decode_field(&secret, field)
}

/// Provisioned API key stored in a secret, if any
pub async fn read_api_key(store: &dyn SecretStore, namespace: &str, name: &str) -> Option<String> {
    let secret = match store.get(namespace, name).await {
        Ok(secret) => secret,
        Err(e) => {
            tracing::debug!(namespace, name, error = %e, "could not read secret");
            return None;
        }
    };
    decode_field(&secret, API_KEY_FIELD).or_else(|| decode_field(&secret, LEGACY_API_KEY_FIELD))
}

fn decode_field(secret: &Secret, field: &str) -> Option<String> {
    let bytes = secret.data.as_ref()?.get(field)?;
    let value = String::from_utf8(bytes.0.clone()).ok()?;
    if value.is_empty() { None } else { Some(value) }
}

/// Set `field` to `value` on an existing secret.
///
/// With `dry_run` every step runs except the final write.
pub async fn patch_field(
    store: &dyn SecretStore,
    namespace: &str,
    name: &str,
    field: &str,
    value: &str,
    dry_run: bool,
) -> Result<PatchReport> {
    let mut secret = store.get(namespace, name).await?;

    let data = secret.data.get_or_insert_with(Default::default);
    let change = match data.get(field) {
        None => FieldChange::Created,
        Some(existing) if existing.0 == value.as_bytes() => FieldChange::Unchanged,
        Some(_) => FieldChange::Updated,
    };
    data.insert(field.to_string(), ByteString(value.as_bytes().to_vec()));

    let write = change != FieldChange::Unchanged && !dry_run;
    if write {
        store.replace(&secret).await?;
    }

    let report = PatchReport {
        namespace: namespace.to_string(),
        name: name.to_string(),
        field: field.to_string(),
        change,
        written: write,
        dry_run,
    };
    if dry_run {
        tracing::warn!("Dry-run: {}", report);
    } else if write {
        tracing::info!("Secret {} updated ({})", name, report);
    } else {
        tracing::info!("Secret {} already holds the key", name);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn secret(namespace: &str, name: &str, data: Option<BTreeMap<String, ByteString>>) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data,
            ..Default::default()
        }
    }

    fn data(field: &str, value: &[u8]) -> Option<BTreeMap<String, ByteString>> {
        Some(BTreeMap::from([(field.to_string(), ByteString(value.to_vec()))]))
    }

    #[tokio::test]
    async fn test_patch_then_read_roundtrip() {
        let store = MockSecretStore::with_secrets(vec![secret("search", "meili-key", None)]);

        let value = "sk_live_ünïcødé_🔑";
        let report = patch_field(&store, "search", "meili-key", API_KEY_FIELD, value, false)
            .await
            .unwrap();
        assert_eq!(report.change, FieldChange::Created);
        assert!(report.written);

        let read = read_api_key(&store, "search", "meili-key").await;
        assert_eq!(read.as_deref(), Some(value));
    }

    #[tokio::test]
    async fn test_patch_wire_format_is_base64() {
        let store = MockSecretStore::with_secrets(vec![secret("default", "s", None)]);
        patch_field(&store, "default", "s", API_KEY_FIELD, "test", false)
            .await
            .unwrap();

        let stored = store.get("default", "s").await.unwrap();
        let wire = serde_json::to_value(&stored).unwrap();
        assert_eq!(wire["data"]["api-key"], "dGVzdA==");
    }

    #[tokio::test]
    async fn test_patch_preserves_other_fields() {
        let mut existing = data("username", b"admin").unwrap();
        existing.insert(API_KEY_FIELD.to_string(), ByteString(b"old".to_vec()));
        let store = MockSecretStore::with_secrets(vec![secret("default", "s", Some(existing))]);

        let report = patch_field(&store, "default", "s", API_KEY_FIELD, "new", false)
            .await
            .unwrap();
        assert_eq!(report.change, FieldChange::Updated);

        assert_eq!(read_field(&store, "default", "s", "username").await.as_deref(), Some("admin"));
        assert_eq!(read_api_key(&store, "default", "s").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_dry_run_skips_write() {
        let store = MockSecretStore::with_secrets(vec![secret("default", "s", data(API_KEY_FIELD, b"old"))]);

        let report = patch_field(&store, "default", "s", API_KEY_FIELD, "new", true)
            .await
            .unwrap();
        assert_eq!(report.change, FieldChange::Updated);
        assert!(!report.written);
        assert_eq!(report.to_string(), "would overwrite field 'api-key' of secret default/s");

        assert_eq!(store.operation_counts().replaces, 0);
        assert_eq!(read_api_key(&store, "default", "s").await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_unchanged_value_not_rewritten() {
        let store = MockSecretStore::with_secrets(vec![secret("default", "s", data(API_KEY_FIELD, b"same"))]);
        let report = patch_field(&store, "default", "s", API_KEY_FIELD, "same", false)
            .await
            .unwrap();
        assert_eq!(report.change, FieldChange::Unchanged);
        assert!(!report.written);
        assert_eq!(store.operation_counts().replaces, 0);
    }

    #[tokio::test]
    async fn test_patch_missing_secret_errors() {
        let store = MockSecretStore::new();
        let result = patch_field(&store, "default", "absent", API_KEY_FIELD, "v", false).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_read_absent_cases() {
        let store = MockSecretStore::with_secrets(vec![
            secret("default", "no-data", None),
            secret("default", "other-field", data("password", b"x")),
            secret("default", "binary", data(API_KEY_FIELD, &[0xff, 0xfe, 0x00])),
            secret("default", "legacy", data("api_key", b"legacy-key")),
        ]);

        assert_eq!(read_api_key(&store, "default", "missing").await, None);
        assert_eq!(read_api_key(&store, "default", "no-data").await, None);
        assert_eq!(read_api_key(&store, "default", "other-field").await, None);
        assert_eq!(read_api_key(&store, "default", "binary").await, None);
        assert_eq!(read_api_key(&store, "default", "legacy").await.as_deref(), Some("legacy-key"));
    }
}
