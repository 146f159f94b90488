//! Create-if-absent for requested indexes

use crate::engine::SearchEngine;
use crate::types::Scope;

/// What [`ensure_indexes`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Request was `*`; nothing checked
    pub wildcard: bool,
    pub existing: Vec<String>,
    pub created: Vec<String>,
    /// Indexes whose check or creation failed, with the error
    pub failed: Vec<(String, String)>,
}

impl IndexReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Make sure every explicitly requested index exists.
///
/// Failures are logged per index and never abort the run.
pub async fn ensure_indexes(engine: &dyn SearchEngine, indexes: &Scope) -> IndexReport {
    let mut report = IndexReport::default();
    if indexes.is_all() {
        tracing::info!("Index creation skipped (wildcard '*')");
        report.wildcard = true;
        return report;
    }

    for uid in indexes.names() {
        match engine.index_exists(uid).await {
            Ok(true) => {
                tracing::debug!(index = uid, "index exists");
                report.existing.push(uid.to_string());
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Could not check index '{}': {}", uid, e);
                report.failed.push((uid.to_string(), e.to_string()));
                continue;
            }
        }

        match engine.create_index(uid).await {
            Ok(()) => {
                tracing::info!("Index '{}' created", uid);
                report.created.push(uid.to_string());
            }
            Err(e) => {
                tracing::warn!("Could not create index '{}': {}", uid, e);
                report.failed.push((uid.to_string(), e.to_string()));
            }
        }
    }
    report
}
