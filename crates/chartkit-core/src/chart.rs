//! Chart.yaml metadata and release versions
//!
//! Charts live in immediate sub-directories of a `charts/` root. Only the
//! fields the tooling reads are modelled; everything else in the file is
//! left untouched when the version is rewritten.

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Name of the chart metadata file
pub const CHART_FILE: &str = "Chart.yaml";

/// Top-level `version:` line, capturing the spacing and quote style around the value
static VERSION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^version:([ \t]*)(["']?)[^"'\s#]*(["']?)"#).expect("valid regex")
});

/// Helm Chart.yaml structure
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// API version (v1 or v2)
    #[serde(default)]
    pub api_version: String,

    /// Chart name
    #[serde(default)]
    pub name: String,

    /// Chart version (SemVer)
    #[serde(default)]
    pub version: Option<String>,

    /// Chart description
    #[serde(default)]
    pub description: Option<String>,

    /// Chart type (application or library)
    #[serde(default, rename = "type")]
    pub chart_type: Option<String>,

    /// App version
    #[serde(default)]
    pub app_version: Option<String>,

    /// Keywords for searching
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Project home page
    #[serde(default)]
    pub home: Option<String>,

    /// Whether chart is deprecated
    #[serde(default)]
    pub deprecated: bool,

    /// Annotations
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl ChartMetadata {
    /// Parse Chart.yaml content
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a Chart.yaml file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ChartNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `Chart.yaml` from a chart directory
    pub fn load(chart_dir: &Path) -> Result<Self> {
        Self::from_file(&chart_dir.join(CHART_FILE))
    }

    /// Library charts are not installable
    pub fn is_library(&self) -> bool {
        self.chart_type.as_deref() == Some("library")
    }

    /// The recorded version, if it is a strict `X.Y.Z` release version
    pub fn release_version(&self) -> Option<Version> {
        self.version.as_deref().and_then(parse_release_version)
    }
}

/// Parse a strict `MAJOR.MINOR.PATCH` version (no pre-release, no build metadata)
pub fn parse_release_version(s: &str) -> Option<Version> {
    Version::parse(s.trim())
        .ok()
        .filter(|v| v.pre.is_empty() && v.build.is_empty())
}

/// List chart directories under `charts_root`, sorted by name
pub fn list_chart_dirs(charts_root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(charts_root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Replace the top-level `version:` value in Chart.yaml content.
///
/// Only the value itself changes: quoting, spacing, trailing comments and
/// every other line are kept byte for byte.
pub fn set_version_field(content: &str, new_version: &Version) -> Result<String> {
    if !VERSION_LINE.is_match(content) {
        return Err(CoreError::MissingField {
            field: "version".to_string(),
        });
    }

    let replacement = format!("version:${{1}}${{2}}{}${{3}}", new_version);
    let updated = VERSION_LINE.replace(content, replacement.as_str()).into_owned();

    let reparsed = ChartMetadata::from_yaml(&updated)?;
    if reparsed.version.as_deref() != Some(new_version.to_string().as_str()) {
        return Err(CoreError::InvalidChart {
            message: format!("version field could not be rewritten to {}", new_version),
        });
    }

    Ok(updated)
}

/// Rewrite the version of a Chart.yaml file in place
pub fn write_chart_version(chart_yaml: &Path, new_version: &Version) -> Result<()> {
    let content = fs::read_to_string(chart_yaml)?;
    let updated = set_version_field(&content, new_version)?;
    fs::write(chart_yaml, updated)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CHART: &str = r#"apiVersion: v2
name: meilisearch
description: Lightning fast search
type: application
version: 1.2.3 # bumped by CI
appVersion: "v1.11.0"
dependencies:
  - name: common
    version: 0.1.0
"#;

    #[test]
    fn test_parse_chart_metadata() {
        let chart = ChartMetadata::from_yaml(CHART).unwrap();
        assert_eq!(chart.name, "meilisearch");
        assert_eq!(chart.version.as_deref(), Some("1.2.3"));
        assert_eq!(chart.app_version.as_deref(), Some("v1.11.0"));
        assert!(!chart.is_library());
        assert_eq!(chart.release_version(), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_library_chart() {
        let chart = ChartMetadata::from_yaml("apiVersion: v2\nname: common\ntype: library\nversion: 0.1.0\n").unwrap();
        assert!(chart.is_library());
    }

    #[test]
    fn test_parse_release_version_is_strict() {
        assert_eq!(parse_release_version("0.4.12"), Some(Version::new(0, 4, 12)));
        assert_eq!(parse_release_version(" 2.0.0 "), Some(Version::new(2, 0, 0)));
        assert_eq!(parse_release_version("1.0.0-rc.1"), None);
        assert_eq!(parse_release_version("1.0.0+build5"), None);
        assert_eq!(parse_release_version("1.0"), None);
        assert_eq!(parse_release_version("ingress-1.0.0"), None);
    }

    #[test]
    fn test_set_version_changes_only_version() {
        let updated = set_version_field(CHART, &Version::new(1, 3, 0)).unwrap();
        assert_eq!(updated, CHART.replace("version: 1.2.3 #", "version: 1.3.0 #"));
        // nested dependency version untouched
        assert!(updated.contains("    version: 0.1.0\n"));
    }

    #[test]
    fn test_set_version_keeps_quotes() {
        let content = "apiVersion: v2\nname: demo\nversion: \"0.1.0\"\n";
        let updated = set_version_field(content, &Version::new(0, 2, 0)).unwrap();
        assert_eq!(updated, "apiVersion: v2\nname: demo\nversion: \"0.2.0\"\n");
    }

    #[test]
    fn test_set_version_missing_field() {
        let result = set_version_field("apiVersion: v2\nname: demo\n", &Version::new(1, 0, 0));
        assert!(matches!(result, Err(CoreError::MissingField { .. })));
    }

    #[test]
    fn test_list_chart_dirs_sorted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("zeta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::write(dir.path().join("README.md"), "not a chart").unwrap();

        let dirs = list_chart_dirs(dir.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_write_chart_version_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CHART_FILE);
        fs::write(&path, CHART).unwrap();

        write_chart_version(&path, &Version::new(2, 0, 0)).unwrap();
        let chart = ChartMetadata::from_file(&path).unwrap();
        assert_eq!(chart.version.as_deref(), Some("2.0.0"));
        assert_eq!(chart.description.as_deref(), Some("Lightning fast search"));
    }

    #[test]
    fn test_load_missing_chart() {
        let dir = TempDir::new().unwrap();
        let result = ChartMetadata::load(dir.path());
        assert!(matches!(result, Err(CoreError::ChartNotFound { .. })));
    }
}
