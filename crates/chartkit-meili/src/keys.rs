//! API key validation, reuse and creation

use chrono::Utc;

use crate::engine::SearchEngine;
use crate::error::{MeiliError, Result};
use crate::matcher::candidates;
use crate::types::KeyRequest;

/// Characters of a key shown in logs
const KEY_LOG_PREFIX: usize = 8;

/// Shortened key for log output
pub fn redact(key: &str) -> String {
    let prefix: String = key.chars().take(KEY_LOG_PREFIX).collect();
    format!("{}...", prefix)
}

/// Whether `key` is usable.
///
/// The server must answer `available` when called with the key, and the
/// master credential must still see the key unexpired. Every failure reads
/// as invalid.
pub async fn validate_api_key(engine: &dyn SearchEngine, key: &str) -> bool {
    match engine.key_health(key).await {
        Ok(health) if health.is_available() => {}
        Ok(health) => {
            tracing::debug!(key = %redact(key), status = %health.status, "server not available");
            return false;
        }
        Err(e) => {
            tracing::debug!(key = %redact(key), error = %e, "health check with key failed");
            return false;
        }
    }

    match engine.get_key(key).await {
        Ok(Some(found)) if !found.is_expired(Utc::now()) => true,
        Ok(Some(_)) => {
            tracing::debug!(key = %redact(key), "key expired");
            false
        }
        Ok(None) => {
            tracing::debug!(key = %redact(key), "key unknown to server");
            false
        }
        Err(e) => {
            tracing::debug!(key = %redact(key), error = %e, "key lookup failed");
            false
        }
    }
}

/// First existing key that matches `request` and validates.
///
/// Listing failures are logged and read as "no match".
pub async fn find_matching_key(engine: &dyn SearchEngine, request: &KeyRequest) -> Option<String> {
    let keys = match engine.list_keys().await {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!("Could not list API keys: {}", e);
            return None;
        }
    };

    for candidate in candidates(&keys, request) {
        if validate_api_key(engine, candidate.key).await {
            tracing::info!(
                "Reusing existing API key {} (matched by {})",
                redact(candidate.key),
                candidate.reason
            );
            return Some(candidate.key.to_string());
        }
        tracing::debug!(key = %redact(candidate.key), "candidate failed validation");
    }
    None
}

/// Create a key for `request` and return its value
pub async fn create_api_key(engine: &dyn SearchEngine, request: &KeyRequest) -> Result<String> {
    let created = engine
        .create_key(&request.to_create())
        .await
        .map_err(|e| MeiliError::KeyCreation {
            message: e.to_string(),
        })?;

    let key = created.value().ok_or_else(|| MeiliError::KeyCreation {
        message: "server returned no key value".to_string(),
    })?;
    tracing::info!("API key created: {}", redact(key));
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSearchEngine;
    use crate::types::{ApiKey, Scope};
    use chrono::Duration;

    fn request() -> KeyRequest {
        KeyRequest {
            description: "Provisioned API Key".to_string(),
            name: "Provisioned API Key (default/meili)".to_string(),
            indexes: Scope::All,
            actions: Scope::All,
        }
    }

    fn key(value: &str, description: &str) -> ApiKey {
        ApiKey {
            key: Some(value.to_string()),
            description: Some(description.to_string()),
            indexes: Scope::All,
            actions: Scope::All,
            ..Default::default()
        }
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("0123456789abcdef"), "01234567...");
        assert_eq!(redact("ab"), "ab...");
    }

    #[tokio::test]
    async fn test_validate_known_key() {
        let engine = MockSearchEngine::with_keys(vec![key("good", "x")]);
        assert!(validate_api_key(&engine, "good").await);
        assert!(!validate_api_key(&engine, "unknown").await);
    }

    #[tokio::test]
    async fn test_validate_expired_key() {
        let mut expired = key("old", "x");
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        let engine = MockSearchEngine::with_keys(vec![expired]);
        assert!(!validate_api_key(&engine, "old").await);
    }

    #[tokio::test]
    async fn test_validate_unreachable() {
        let engine = MockSearchEngine::with_keys(vec![key("good", "x")]).unavailable_for(1);
        assert!(!validate_api_key(&engine, "good").await);
    }

    #[tokio::test]
    async fn test_find_skips_invalid_candidates() {
        let mut expired = key("expired", "Provisioned API Key");
        expired.expires_at = Some(Utc::now() - Duration::days(1));
        let engine = MockSearchEngine::with_keys(vec![expired, key("wide", "Admin")]);

        let found = find_matching_key(&engine, &request()).await;
        assert_eq!(found.as_deref(), Some("wide"));
    }

    #[tokio::test]
    async fn test_find_listing_failure_is_none() {
        let engine = MockSearchEngine::with_keys(vec![key("k", "Provisioned API Key")])
            .with_failing_listing();
        assert_eq!(find_matching_key(&engine, &request()).await, None);
    }

    #[tokio::test]
    async fn test_find_no_candidates_validates_nothing() {
        let engine = MockSearchEngine::with_keys(vec![ApiKey {
            key: Some("narrow".into()),
            name: Some("Other".into()),
            indexes: Scope::parse_list("movies"),
            actions: Scope::parse_list("search"),
            ..Default::default()
        }]);
        let books = KeyRequest {
            indexes: Scope::parse_list("books"),
            ..request()
        };
        assert_eq!(find_matching_key(&engine, &books).await, None);
        assert_eq!(engine.operation_counts().key_lookups, 0);
    }

    #[tokio::test]
    async fn test_find_wildcard_request_reuses_scoped_key() {
        let engine = MockSearchEngine::with_keys(vec![ApiKey {
            key: Some("scoped".into()),
            name: Some("Other".into()),
            indexes: Scope::parse_list("movies"),
            actions: Scope::parse_list("search"),
            ..Default::default()
        }]);
        assert_eq!(find_matching_key(&engine, &request()).await.as_deref(), Some("scoped"));
    }

    #[tokio::test]
    async fn test_create_api_key() {
        let engine = MockSearchEngine::new();
        let value = create_api_key(&engine, &request()).await.unwrap();

        let keys = engine.keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].value(), Some(value.as_str()));
        assert_eq!(keys[0].name.as_deref(), Some("Provisioned API Key (default/meili)"));
        assert_eq!(keys[0].description.as_deref(), Some("Provisioned API Key"));
    }

    #[tokio::test]
    async fn test_create_failure_is_key_creation_error() {
        let engine = MockSearchEngine::new().with_failing_creates();
        assert!(matches!(
            create_api_key(&engine, &request()).await,
            Err(MeiliError::KeyCreation { .. })
        ));
    }
}
