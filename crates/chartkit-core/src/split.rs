//! Split a rendered manifest stream into files
//!
//! `helm template` prefixes every document with a `# Source: <chart>/templates/<path>`
//! comment. Each document is written to `<out>/<path>`; documents without a
//! source comment get `manifest-NN.yaml`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

const SOURCE_PREFIX: &str = "# Source:";
const TEMPLATES_SEGMENT: &str = "/templates/";

/// One non-blank document of the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDocument {
    /// Position among non-blank documents
    pub index: usize,
    /// Value of the first `# Source:` comment, if any
    pub source: Option<String>,
    /// Document text, separators excluded
    pub content: String,
}

/// Split on lines whose trimmed content is exactly `---`, dropping blank documents
pub fn split_documents(content: &str) -> Vec<SplitDocument> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for line in content.split_inclusive('\n') {
        if line.trim() == "---" {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .filter(|part| !part.trim().is_empty())
        .enumerate()
        .map(|(index, content)| SplitDocument {
            index,
            source: source_of(&content),
            content,
        })
        .collect()
}

fn source_of(document: &str) -> Option<String> {
    document
        .lines()
        .find_map(|line| line.strip_prefix(SOURCE_PREFIX))
        .map(|rest| rest.trim().to_string())
}

/// Output path for a document, relative to the output directory
pub fn relative_target(document: &SplitDocument) -> PathBuf {
    let fallback = || PathBuf::from(format!("manifest-{:02}.yaml", document.index));

    let Some(source) = document.source.as_deref().filter(|s| !s.is_empty()) else {
        return fallback();
    };

    let target = match source.split_once(TEMPLATES_SEGMENT) {
        Some((_, rest)) => rest,
        None => source,
    };
    let target = PathBuf::from(target);

    // Stay inside the output directory
    let escapes = target
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || target.as_os_str().is_empty() {
        return fallback();
    }
    target
}

/// Split `content` and write each document under `out_dir`, returning the written paths
pub fn split_manifests(content: &str, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for document in split_documents(content) {
        let path = out_dir.join(relative_target(&document));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &document.content)?;
        tracing::debug!(path = %path.display(), "wrote manifest");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STREAM: &str = "---
# Source: meilisearch/templates/service.yaml
apiVersion: v1
kind: Service
---
# Source: meilisearch/templates/jobs/provision.yaml
apiVersion: batch/v1
kind: Job
---

---
apiVersion: v1
kind: ConfigMap
";

    #[test]
    fn test_split_documents() {
        let docs = split_documents(STREAM);
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].source.as_deref(), Some("meilisearch/templates/service.yaml"));
        assert_eq!(docs[1].source.as_deref(), Some("meilisearch/templates/jobs/provision.yaml"));
        assert_eq!(docs[2].source, None);
        assert_eq!(docs[2].index, 2);
        assert!(docs[0].content.starts_with("# Source:"));
        assert!(!docs[0].content.contains("---"));
    }

    #[test]
    fn test_relative_targets() {
        let docs = split_documents(STREAM);
        assert_eq!(relative_target(&docs[0]), PathBuf::from("service.yaml"));
        assert_eq!(relative_target(&docs[1]), PathBuf::from("jobs/provision.yaml"));
        assert_eq!(relative_target(&docs[2]), PathBuf::from("manifest-02.yaml"));
    }

    #[test]
    fn test_source_without_templates_segment_kept_whole() {
        let doc = SplitDocument {
            index: 0,
            source: Some("crds/widget.yaml".to_string()),
            content: String::new(),
        };
        assert_eq!(relative_target(&doc), PathBuf::from("crds/widget.yaml"));
    }

    #[test]
    fn test_escaping_source_falls_back() {
        let doc = SplitDocument {
            index: 4,
            source: Some("demo/templates/../../etc/passwd".to_string()),
            content: String::new(),
        };
        assert_eq!(relative_target(&doc), PathBuf::from("manifest-04.yaml"));

        let absolute = SplitDocument {
            index: 1,
            source: Some("/etc/passwd".to_string()),
            content: String::new(),
        };
        assert_eq!(relative_target(&absolute), PathBuf::from("manifest-01.yaml"));
    }

    #[test]
    fn test_split_manifests_writes_files() {
        let dir = TempDir::new().unwrap();
        let written = split_manifests(STREAM, dir.path()).unwrap();
        assert_eq!(written.len(), 3);

        let job = fs::read_to_string(dir.path().join("jobs/provision.yaml")).unwrap();
        assert!(job.contains("kind: Job"));
        let fallback = fs::read_to_string(dir.path().join("manifest-02.yaml")).unwrap();
        assert!(fallback.contains("kind: ConfigMap"));
    }
}
