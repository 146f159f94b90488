//! Semver bump decisions

use std::collections::HashMap;
use std::fmt;

use chartkit_core::parse_release_version;
use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;

use crate::github::LabelSource;

static PR_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\d+)").expect("valid regex"));

/// Kind of version increment, ordered `Patch < Minor < Major`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bump {
    Patch,
    Minor,
    Major,
}

impl Bump {
    /// Bump implied by a single label, if any
    pub fn from_label(label: &str) -> Option<Bump> {
        if label.eq_ignore_ascii_case("major") {
            Some(Bump::Major)
        } else if label.eq_ignore_ascii_case("minor") {
            Some(Bump::Minor)
        } else {
            None
        }
    }

    pub fn apply(self, version: &Version) -> Version {
        match self {
            Bump::Patch => Version::new(version.major, version.minor, version.patch + 1),
            Bump::Minor => Version::new(version.major, version.minor + 1, 0),
            Bump::Major => Version::new(version.major + 1, 0, 0),
        }
    }
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bump::Patch => write!(f, "patch"),
            Bump::Minor => write!(f, "minor"),
            Bump::Major => write!(f, "major"),
        }
    }
}

/// First `#<number>` in a commit message
pub fn find_pr_number(message: &str) -> Option<u64> {
    PR_REFERENCE
        .captures(message)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Bump for a set of commit messages.
///
/// Defaults to patch. A `major` label on any referenced PR wins
/// immediately; `minor` upgrades. Without a label source no lookups happen.
/// Failed lookups are logged and count as unlabeled.
pub async fn classify<S: AsRef<str>>(labels: Option<&dyn LabelSource>, messages: &[S]) -> Bump {
    let Some(source) = labels else {
        return Bump::Patch;
    };

    let mut bump = Bump::Patch;
    let mut seen: HashMap<u64, Option<Bump>> = HashMap::new();

    for message in messages {
        let Some(pr) = find_pr_number(message.as_ref()) else {
            continue;
        };
        let pr_bump = match seen.get(&pr) {
            Some(cached) => *cached,
            None => {
                let found = match source.labels(pr).await {
                    Ok(names) => names.iter().filter_map(|l| Bump::from_label(l)).max(),
                    Err(e) => {
                        tracing::warn!("Failed to fetch PR #{} labels: {}", pr, e);
                        None
                    }
                };
                seen.insert(pr, found);
                found
            }
        };

        match pr_bump {
            Some(Bump::Major) => return Bump::Major,
            Some(found) => bump = bump.max(found),
            None => {}
        }
    }
    bump
}

/// Highest strict `X.Y.Z` among tags named `<chart>-X.Y.Z`
pub fn latest_tag<S: AsRef<str>>(tags: &[S], chart: &str) -> Option<(String, Version)> {
    let prefix = format!("{}-", chart);
    tags.iter()
        .filter_map(|tag| {
            let tag = tag.as_ref();
            let version = parse_release_version(tag.strip_prefix(&prefix)?)?;
            Some((tag.to_string(), version))
        })
        .max_by(|a, b| a.1.cmp(&b.1))
}

/// Version to bump from: the higher of the recorded and tagged versions
pub fn base_version(recorded: Option<&Version>, tagged: &Version) -> Version {
    match recorded {
        Some(recorded) if recorded > tagged => recorded.clone(),
        _ => tagged.clone(),
    }
}
