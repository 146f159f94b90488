//! Chart rendering harness
//!
//! Renders a chart with `helm template` and parses the emitted stream, so
//! chart behaviour can be asserted on structured documents.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CoreError, Result};
use crate::yaml::parse_documents;

/// Check whether `helm` is on PATH
pub fn helm_available() -> bool {
    which::which("helm").is_ok()
}

/// Builder for a `helm template` invocation
#[derive(Debug, Clone)]
pub struct HelmRenderer {
    chart: PathBuf,
    release: String,
    namespace: String,
    values: Option<serde_yaml::Value>,
}

impl HelmRenderer {
    pub fn new(chart: impl Into<PathBuf>) -> Self {
        Self {
            chart: chart.into(),
            release: "demo".to_string(),
            namespace: "default".to_string(),
            values: None,
        }
    }

    pub fn release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Values overlay passed with `--values`
    pub fn values(mut self, values: serde_yaml::Value) -> Self {
        self.values = Some(values);
        self
    }

    pub fn chart(&self) -> &Path {
        &self.chart
    }

    /// Run `helm template` and parse its output
    pub fn render(&self) -> Result<RenderedChart> {
        let helm = which::which("helm").map_err(|_| CoreError::ToolNotFound {
            tool: "helm".to_string(),
        })?;

        let mut command = Command::new(helm);
        command
            .arg("template")
            .arg(&self.release)
            .arg(&self.chart)
            .arg("--namespace")
            .arg(&self.namespace);

        // Kept alive until helm exits
        let values_file = match &self.values {
            Some(values) => {
                let file = tempfile::Builder::new()
                    .prefix("chartkit-values-")
                    .suffix(".yaml")
                    .tempfile()?;
                std::fs::write(file.path(), serde_yaml::to_string(values)?)?;
                command.arg("--values").arg(file.path());
                Some(file)
            }
            None => None,
        };

        tracing::debug!(chart = %self.chart.display(), release = %self.release, "running helm template");
        let output = command.output()?;
        drop(values_file);

        if !output.status.success() {
            return Err(CoreError::RenderFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let raw = String::from_utf8_lossy(&output.stdout).into_owned();
        let documents = parse_documents(&raw)?;
        Ok(RenderedChart { raw, documents })
    }
}

/// Parsed `helm template` output
#[derive(Debug, Clone)]
pub struct RenderedChart {
    /// Raw stream as emitted by helm
    pub raw: String,
    /// Non-empty documents
    pub documents: Vec<serde_yaml::Value>,
}

impl RenderedChart {
    /// Document kinds in render order
    pub fn kinds(&self) -> Vec<&str> {
        self.documents
            .iter()
            .filter_map(|doc| doc.get("kind").and_then(|k| k.as_str()))
            .collect()
    }

    /// First document of the given kind
    pub fn find_kind(&self, kind: &str) -> Option<&serde_yaml::Value> {
        self.documents
            .iter()
            .find(|doc| doc.get("kind").and_then(|k| k.as_str()) == Some(kind))
    }

    /// `metadata.name` of a document
    pub fn name_of(doc: &serde_yaml::Value) -> Option<&str> {
        doc.get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
