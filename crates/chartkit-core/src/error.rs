//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Chart.yaml not found: {path}")]
    ChartNotFound { path: String },

    #[error("Invalid Chart.yaml: {message}")]
    InvalidChart { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Markers not found in {path}. Add '{start}' and '{end}' to the file.")]
    MarkersNotFound {
        path: String,
        start: String,
        end: String,
    },

    #[error("'{tool}' not found on PATH")]
    ToolNotFound { tool: String },

    #[error("helm template failed ({status}): {stderr}")]
    RenderFailed { status: String, stderr: String },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
