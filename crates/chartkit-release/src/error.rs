//! Error types for release automation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("git is not installed or not on PATH")]
    GitNotFound,

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("GitHub API error for {url}: HTTP {status}")]
    GitHub { url: String, status: u16 },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Could not determine the branch to push to")]
    NoBranch,

    #[error(transparent)]
    Chart(#[from] chartkit_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),
}

/// Result type for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl From<reqwest::Error> for ReleaseError {
    fn from(e: reqwest::Error) -> Self {
        ReleaseError::Network {
            message: e.to_string(),
        }
    }
}
