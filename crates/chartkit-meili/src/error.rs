//! Error types for Meilisearch operations

use thiserror::Error;

/// Meilisearch and provisioning errors
#[derive(Debug, Error)]
pub enum MeiliError {
    // ============ API Errors ============
    #[error("Meilisearch API error: {status} {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Invalid Meilisearch URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Task {task_uid} did not succeed: {message}")]
    TaskFailed { task_uid: u64, message: String },

    // ============ Provisioning Errors ============
    #[error("Meilisearch is not responding after {attempts} attempts")]
    NotReady { attempts: u32 },

    #[error("Master key is invalid: {message}")]
    MasterKeyInvalid { message: String },

    #[error("Failed to create API key: {message}")]
    KeyCreation { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to update secret: {0}")]
    Secret(#[from] chartkit_kube::KubeError),
}

/// Result type for Meilisearch operations
pub type Result<T> = std::result::Result<T, MeiliError>;

impl From<reqwest::Error> for MeiliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MeiliError::Timeout { seconds: 30 }
        } else if e.is_connect() {
            MeiliError::Network {
                message: format!("Connection failed: {}", e),
            }
        } else if e.is_decode() {
            MeiliError::Serialization(e.to_string())
        } else {
            MeiliError::Network {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for MeiliError {
    fn from(e: serde_json::Error) -> Self {
        MeiliError::Serialization(e.to_string())
    }
}
