//! Chartkit Release - chart version automation
//!
//! For every chart under `charts/`, compares the working tree with the
//! chart's latest `<chart>-X.Y.Z` tag, derives a semver bump from the
//! labels of the pull requests referenced by the commits since that tag,
//! and either reports the bump (pull-request builds) or writes, commits and
//! pushes it.

pub mod bump;
pub mod checker;
pub mod error;
pub mod git;
pub mod github;
pub mod summary;

pub use bump::{Bump, classify, find_pr_number, latest_tag};
pub use checker::{ChartOutcome, ChartStatus, CheckReport, CheckerConfig, VersionChecker};
pub use error::{ReleaseError, Result};
pub use git::{Git, git_available};
pub use github::{GitHubLabels, LabelSource, StaticLabels};
pub use summary::StepSummary;
