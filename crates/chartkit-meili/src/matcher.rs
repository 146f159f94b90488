//! Reuse candidates for an existing API key
//!
//! Two passes over the key listing, in listing order:
//!
//! 1. keys whose name is the requested key name, or whose label (name,
//!    falling back to description) equals the requested description
//! 2. keys whose indexes and actions both cover the request; a wildcard
//!    request side is not checked
//!
//! A key appearing in pass 1 is not repeated in pass 2. Keys without a
//! value are never candidates.

use crate::types::{ApiKey, KeyRequest};

/// Why a key was selected as a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason {
    Description,
    Capabilities,
}

impl std::fmt::Display for MatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchReason::Description => write!(f, "description"),
            MatchReason::Capabilities => write!(f, "capabilities"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub key: &'a str,
    pub reason: MatchReason,
}

fn matches_description(key: &ApiKey, request: &KeyRequest) -> bool {
    key.name.as_deref() == Some(request.name.as_str())
        || key.label() == Some(request.description.as_str())
}

/// A wildcard request side places no constraint on the key
fn matches_capabilities(key: &ApiKey, request: &KeyRequest) -> bool {
    (request.indexes.is_all() || key.indexes.covers(&request.indexes))
        && (request.actions.is_all() || key.actions.covers(&request.actions))
}

/// Candidates in the order they should be validated
pub fn candidates<'a>(keys: &'a [ApiKey], request: &KeyRequest) -> Vec<Candidate<'a>> {
    let by_description = keys.iter().filter(|k| matches_description(k, request));
    let by_capabilities = keys
        .iter()
        .filter(|k| !matches_description(k, request) && matches_capabilities(k, request));

    by_description
        .filter_map(|k| {
            k.value().map(|key| Candidate {
                key,
                reason: MatchReason::Description,
            })
        })
        .chain(by_capabilities.filter_map(|k| {
            k.value().map(|key| Candidate {
                key,
                reason: MatchReason::Capabilities,
            })
        }))
        .collect()
}
