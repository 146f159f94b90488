//! Multi-document YAML validation
//!
//! Rendered chart output is a stream of `---` separated documents. Both
//! validators parse every document; the directory validator aggregates
//! per-file failures so the caller can report a count.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::Result;

/// Parse every document of a YAML stream, dropping empty documents
pub fn parse_documents(content: &str) -> Result<Vec<serde_yaml::Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Outcome of validating a single stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamReport {
    /// Parsed with this many non-empty documents
    Valid { documents: usize },
    /// Parsed, but every document was empty
    Empty,
    /// Parsing failed
    Invalid { message: String },
}

impl StreamReport {
    pub fn is_valid(&self) -> bool {
        !matches!(self, StreamReport::Invalid { .. })
    }
}

/// Validate a YAML stream (file contents or stdin)
pub fn validate_stream(content: &str) -> StreamReport {
    match parse_documents(content) {
        Ok(docs) if docs.is_empty() => StreamReport::Empty,
        Ok(docs) => StreamReport::Valid {
            documents: docs.len(),
        },
        Err(e) => StreamReport::Invalid {
            message: e.to_string(),
        },
    }
}

/// Find `.yml`/`.yaml` files (any case) under `root`, sorted
pub fn find_yaml_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_yaml = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
            .unwrap_or(false);
        if is_yaml {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// A file that failed validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregated result of validating a set of files
#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub checked: usize,
    pub failures: Vec<FileValidation>,
}

impl ValidationSummary {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Validate every file, collecting failures instead of stopping at the first one
pub fn validate_files(files: &[PathBuf]) -> ValidationSummary {
    let mut summary = ValidationSummary::default();
    for path in files {
        summary.checked += 1;
        let outcome = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| parse_documents(&content).map_err(|e| e.to_string()));
        if let Err(message) = outcome {
            tracing::debug!(path = %path.display(), "YAML error");
            summary.failures.push(FileValidation {
                path: path.clone(),
                message,
            });
        }
    }
    summary
}
