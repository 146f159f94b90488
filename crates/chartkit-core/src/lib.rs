//! Chartkit Core - chart repository utilities
//!
//! This crate provides the file-level tooling shared by the chartkit commands:
//! - `chart`: `Chart.yaml` metadata, strict release versions and version rewriting
//! - `yaml`: multi-document YAML validation for files and streams
//! - `split`: split a rendered manifest stream into per-template files
//! - `readme`: regenerate the charts table of a documentation page
//! - `render`: render a chart through `helm template` and parse the output

pub mod chart;
pub mod error;
pub mod readme;
pub mod render;
pub mod split;
pub mod yaml;

pub use chart::{
    CHART_FILE, ChartMetadata, list_chart_dirs, parse_release_version, set_version_field,
    write_chart_version,
};
pub use error::{CoreError, Result};
pub use readme::{ChartRow, ReadmeConfig, END_MARKER, START_MARKER};
pub use render::{HelmRenderer, RenderedChart};
pub use split::{SplitDocument, split_manifests};
pub use yaml::{FileValidation, StreamReport, ValidationSummary};
