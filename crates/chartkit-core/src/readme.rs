//! Charts table generator for the documentation README
//!
//! The generated block replaces everything between [`START_MARKER`] and
//! [`END_MARKER`]: a `helm repo add` snippet followed by an HTML table with
//! one row per installable chart.

use std::fs;
use std::path::Path;

use crate::chart::{ChartMetadata, list_chart_dirs};
use crate::error::{CoreError, Result};

pub const START_MARKER: &str = "<!-- CHARTS:START -->";
pub const END_MARKER: &str = "<!-- CHARTS:END -->";

/// Helm repository the install commands refer to
#[derive(Debug, Clone)]
pub struct ReadmeConfig {
    /// Local alias used in `helm repo add <alias>`
    pub repo_alias: String,
    /// Published repository URL
    pub repo_url: String,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            repo_alias: "mbround18".to_string(),
            repo_url: "https://mbround18.github.io/helm-charts/".to_string(),
        }
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRow {
    /// Directory name under `charts/`
    pub dir: String,
    /// Chart name from Chart.yaml, or the directory name
    pub name: String,
    /// Chart version, or `-`
    pub version: String,
}

/// Collect rows for every installable chart under `charts_root`.
///
/// Directories without a readable Chart.yaml and library charts are skipped.
pub fn collect_rows(charts_root: &Path) -> Result<Vec<ChartRow>> {
    let mut rows = Vec::new();
    for chart_dir in list_chart_dirs(charts_root)? {
        let dir = match chart_dir.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };
        let meta = match ChartMetadata::load(&chart_dir) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(chart = %dir, error = %e, "skipping chart directory");
                continue;
            }
        };
        if meta.is_library() {
            continue;
        }
        let name = if meta.name.is_empty() {
            dir.clone()
        } else {
            meta.name.clone()
        };
        rows.push(ChartRow {
            version: meta.version.unwrap_or_else(|| "-".to_string()),
            dir,
            name,
        });
    }
    Ok(rows)
}

/// Escape text for HTML content
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn code_block(command: &str) -> String {
    format!(
        "<pre><code class=\"language-sh\">{}</code></pre>",
        escape_html(command)
    )
}

/// Render the HTML table
pub fn render_table(rows: &[ChartRow], config: &ReadmeConfig) -> String {
    let mut lines = vec![
        "<table>".to_string(),
        "  <thead>".to_string(),
        "    <tr><th>name</th><th>version</th><th>setup</th><th>values</th></tr>".to_string(),
        "  </thead>".to_string(),
        "  <tbody>".to_string(),
    ];

    for row in rows {
        let link = format!(
            "<a href=\"../charts/{}/README.md\">{}</a>",
            row.dir,
            escape_html(&row.name)
        );
        let install = format!(
            "helm install {dir} {alias}/{dir} --namespace {dir} --create-namespace",
            dir = row.dir,
            alias = config.repo_alias
        );
        let values = format!("helm show values {}/{}", config.repo_alias, row.dir);
        lines.push(format!(
            "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            link,
            row.version,
            code_block(&install),
            code_block(&values)
        ));
    }

    lines.push("  </tbody>".to_string());
    lines.push("</table>".to_string());
    lines.join("\n")
}

/// Render the full block placed between the markers
pub fn render_block(rows: &[ChartRow], config: &ReadmeConfig) -> String {
    format!(
        "```bash\nhelm repo add {} {}\nhelm repo update\n```\n\n{}",
        config.repo_alias,
        config.repo_url,
        render_table(rows, config)
    )
}

/// Replace the marked region of `content` with `block`
pub fn inject(content: &str, block: &str, source: &str) -> Result<String> {
    let markers_missing = || CoreError::MarkersNotFound {
        path: source.to_string(),
        start: START_MARKER.to_string(),
        end: END_MARKER.to_string(),
    };

    let (before, rest) = content.split_once(START_MARKER).ok_or_else(markers_missing)?;
    let (_, after) = rest.split_once(END_MARKER).ok_or_else(markers_missing)?;

    Ok(format!(
        "{before}{START_MARKER}\n\n{block}\n\n{END_MARKER}{after}"
    ))
}

/// Regenerate the charts table of `readme_path` from `charts_root`
pub fn update_readme(readme_path: &Path, charts_root: &Path, config: &ReadmeConfig) -> Result<usize> {
    let content = fs::read_to_string(readme_path)?;
    let rows = collect_rows(charts_root)?;
    let updated = inject(
        &content,
        &render_block(&rows, config),
        &readme_path.display().to_string(),
    )?;
    fs::write(readme_path, updated)?;
    Ok(rows.len())
}
