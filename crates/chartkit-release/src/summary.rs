//! GitHub Actions step summary

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;

/// Append-only markdown report (`GITHUB_STEP_SUMMARY`); a no-op without a path
#[derive(Debug, Clone, Default)]
pub struct StepSummary {
    path: Option<PathBuf>,
}

impl StepSummary {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Append `- Chart: <chart> - <message>`
    pub fn chart_line(&self, chart: &str, message: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "- Chart: {} - {}", chart, message)?;
        Ok(())
    }
}
