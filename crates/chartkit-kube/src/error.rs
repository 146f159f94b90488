//! Error types for chartkit-kube

use thiserror::Error;

/// Result type for chartkit-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur during Kubernetes operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Secret not found
    #[error("secret '{name}' not found in namespace '{namespace}'")]
    SecretNotFound { name: String, namespace: String },

    /// Client configuration could not be loaded
    #[error("invalid kubernetes configuration: {0}")]
    Config(String),

    /// Secret object is missing required metadata
    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    /// Conflicting concurrent update (409)
    #[error("secret '{name}' in namespace '{namespace}' was modified concurrently")]
    Conflict { name: String, namespace: String },
}

impl KubeError {
    /// Check if this is a not-found error, from the API or the store
    pub fn is_not_found(&self) -> bool {
        match self {
            KubeError::SecretNotFound { .. } => true,
            KubeError::Api(kube::Error::Api(resp)) => resp.code == 404,
            _ => false,
        }
    }
}
