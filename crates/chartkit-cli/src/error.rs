//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use chartkit_core::CoreError;
use chartkit_kube::KubeError;
use chartkit_meili::MeiliError;
use chartkit_release::ReleaseError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Input missing, empty or unusable
    #[error("{message}")]
    #[diagnostic(code(chartkit::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Checks ran and reported failures
    #[error("{message}")]
    #[diagnostic(code(chartkit::cli::failed))]
    Failed { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartkit::cli::io))]
    Io { message: String },

    /// Invalid arguments or option values
    #[error("{message}")]
    #[diagnostic(code(chartkit::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Wrapped library error (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(chartkit::cli::error))]
    Other { message: String },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartkit::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Failed { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn other(err: impl std::fmt::Display) -> Self {
        Self::Other {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            CoreError::ToolNotFound { tool } => CliError::validation_with_help(
                format!("{} is not installed or not on PATH", tool),
                format!("install {} and retry", tool),
            ),
            other => CliError::other(other),
        }
    }
}

impl From<MeiliError> for CliError {
    fn from(err: MeiliError) -> Self {
        match err {
            MeiliError::InvalidConfig { message } => CliError::usage_with_help(
                message,
                "check API_KEY_INDEXES, API_KEY_ACTIONS and MEILI_MASTER_KEY",
            ),
            MeiliError::InvalidUrl { url, reason } => CliError::usage_with_help(
                format!("invalid Meilisearch URL '{}': {}", url, reason),
                "set MEILI_HOST to e.g. http://meilisearch:7700",
            ),
            other => CliError::other(other),
        }
    }
}

impl From<KubeError> for CliError {
    fn from(err: KubeError) -> Self {
        CliError::other(err)
    }
}

impl From<ReleaseError> for CliError {
    fn from(err: ReleaseError) -> Self {
        match err {
            ReleaseError::Io(e) => e.into(),
            ReleaseError::Chart(e) => e.into(),
            other => CliError::other(other),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("no files").exit_code(), 2);
        assert_eq!(CliError::failed("3 errors").exit_code(), 1);
        assert_eq!(CliError::internal("boom").exit_code(), 1);
        let io: CliError = std::io::Error::other("denied").into();
        assert_eq!(io.exit_code(), 5);
    }

    #[test]
    fn test_library_error_mapping() {
        let config: CliError = MeiliError::InvalidConfig {
            message: "no indexes".into(),
        }
        .into();
        assert_eq!(config.exit_code(), exit_codes::USAGE_ERROR);

        let missing_helm: CliError = CoreError::ToolNotFound {
            tool: "helm".into(),
        }
        .into();
        assert_eq!(missing_helm.exit_code(), exit_codes::VALIDATION_ERROR);

        let not_ready: CliError = MeiliError::NotReady { attempts: 30 }.into();
        assert_eq!(not_ready.exit_code(), exit_codes::ERROR);
        assert!(not_ready.to_string().contains("30 attempts"));
    }
}
