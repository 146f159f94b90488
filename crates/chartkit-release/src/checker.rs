//! Chart version checker
//!
//! Per chart: missing Chart.yaml, no prior tag and no changes since the tag
//! are skips. Otherwise the bump is derived from PR labels and either
//! reported to the step summary (pull-request mode) or written, committed
//! and finally pushed.

use std::fmt;
use std::path::{Path, PathBuf};

use chartkit_core::{
    CHART_FILE, ChartMetadata, list_chart_dirs, parse_release_version, write_chart_version,
};
use semver::Version;

use crate::bump::{Bump, base_version, classify, latest_tag};
use crate::error::{ReleaseError, Result};
use crate::git::Git;
use crate::github::LabelSource;
use crate::summary::StepSummary;

/// Version checker settings
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub repo_root: PathBuf,
    /// Charts directory, relative to the repository root unless absolute
    pub charts_dir: PathBuf,
    /// Report bumps without writing (pull-request builds)
    pub pr_mode: bool,
    /// Step summary file, written in pull-request mode
    pub step_summary: Option<PathBuf>,
    /// `GITHUB_REF` of the build, e.g. `refs/heads/main`
    pub git_ref: Option<String>,
    pub remote: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            charts_dir: PathBuf::from("charts"),
            pr_mode: false,
            step_summary: None,
            git_ref: None,
            remote: "origin".to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn charts_root(&self) -> PathBuf {
        if self.charts_dir.is_absolute() {
            self.charts_dir.clone()
        } else {
            self.repo_root.join(&self.charts_dir)
        }
    }
}

/// Branch name of a `refs/heads/<branch>` ref
pub fn branch_from_ref(git_ref: &str) -> Option<&str> {
    git_ref
        .rsplit_once("/heads/")
        .map(|(_, branch)| branch)
        .filter(|b| !b.is_empty())
}

/// What happened to one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartStatus {
    MissingChartFile,
    NoTag,
    Unchanged {
        tag: String,
    },
    /// Recorded version already at or past the target
    UpToDate {
        current: Version,
        target: Version,
    },
    /// Pull-request mode: bump reported, nothing written
    Proposed {
        bump: Bump,
        from: Version,
        to: Version,
    },
    Bumped {
        bump: Bump,
        from: Version,
        to: Version,
        committed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOutcome {
    pub chart: String,
    pub status: ChartStatus,
}

impl fmt::Display for ChartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.chart)?;
        match &self.status {
            ChartStatus::MissingChartFile => write!(f, "no {}, skipped", CHART_FILE),
            ChartStatus::NoTag => write!(f, "no previous tag, skipped"),
            ChartStatus::Unchanged { tag } => write!(f, "no changes since {}", tag),
            ChartStatus::UpToDate { current, target } => {
                write!(f, "already at {} (target {})", current, target)
            }
            ChartStatus::Proposed { bump, from, to } => {
                write!(f, "would bump {} -> {} ({})", from, to, bump)
            }
            ChartStatus::Bumped {
                bump,
                from,
                to,
                committed,
            } => {
                write!(f, "bumped {} -> {} ({})", from, to, bump)?;
                if !committed {
                    write!(f, ", not committed")?;
                }
                Ok(())
            }
        }
    }
}

/// Result of a checker run
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub outcomes: Vec<ChartOutcome>,
    /// Branch pushed to, if a push happened
    pub pushed: Option<String>,
}

impl CheckReport {
    pub fn commits(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ChartStatus::Bumped { committed: true, .. }))
            .count()
    }
}

pub struct VersionChecker<'a> {
    git: Git,
    config: CheckerConfig,
    labels: Option<&'a dyn LabelSource>,
    summary: StepSummary,
}

impl<'a> VersionChecker<'a> {
    /// `labels` is `None` when no repository slug is known
    pub fn new(config: CheckerConfig, labels: Option<&'a dyn LabelSource>) -> Self {
        let summary = if config.pr_mode {
            StepSummary::new(config.step_summary.clone())
        } else {
            StepSummary::default()
        };
        Self {
            git: Git::new(&config.repo_root),
            config,
            labels,
            summary,
        }
    }

    pub async fn run(&self) -> Result<CheckReport> {
        if let Err(e) = self.git.fetch_tags() {
            tracing::warn!("git fetch --tags failed: {}", e);
        }

        if self.config.pr_mode && !self.summary.is_enabled() {
            tracing::warn!("No step summary file set, bump report goes to the log only");
        }

        let mut report = CheckReport::default();
        for chart_dir in list_chart_dirs(&self.config.charts_root())? {
            let Some(chart) = chart_dir.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            tracing::info!("Processing chart: {}", chart);
            let status = self.check_chart(&chart, &chart_dir).await?;
            report.outcomes.push(ChartOutcome { chart, status });
        }

        if self.config.pr_mode {
            return Ok(report);
        }
        if report.commits() == 0 {
            tracing::info!("No version bump commits, nothing to push");
            return Ok(report);
        }

        let branch = self.push_branch()?;
        tracing::info!("Pushing changes to branch: {}", branch);
        self.git.push(&self.config.remote, &branch)?;
        report.pushed = Some(branch);
        Ok(report)
    }

    fn push_branch(&self) -> Result<String> {
        if let Some(branch) = self.config.git_ref.as_deref().and_then(branch_from_ref) {
            return Ok(branch.to_string());
        }
        self.git.current_branch().map_err(|e| {
            tracing::debug!(error = %e, "symbolic-ref failed");
            ReleaseError::NoBranch
        })
    }

    fn report(&self, chart: &str, message: &str) {
        if let Err(e) = self.summary.chart_line(chart, message) {
            tracing::warn!("Could not write step summary: {}", e);
        }
    }

    async fn check_chart(&self, chart: &str, chart_dir: &Path) -> Result<ChartStatus> {
        let chart_yaml = chart_dir.join(CHART_FILE);
        if !chart_yaml.is_file() {
            tracing::warn!("{} not found for {}, skipping.", CHART_FILE, chart);
            return Ok(ChartStatus::MissingChartFile);
        }

        let tags = self.git.tags(&format!("{}-*", chart))?;
        let Some((tag, tagged)) = latest_tag(&tags, chart) else {
            let message = format!("No previous tag found for {}, skipping version bump.", chart);
            tracing::warn!("{}", message);
            self.report(chart, &message);
            return Ok(ChartStatus::NoTag);
        };
        tracing::info!("Latest tag found: {} (version: {})", tag, tagged);

        if self.git.changed_files_since(&tag, chart_dir)?.is_empty() {
            tracing::info!(
                "No changes found for {} since last release, skipping version bump.",
                chart
            );
            self.report(chart, "No changes since last release, skipping version bump.");
            return Ok(ChartStatus::Unchanged { tag });
        }

        tracing::info!("Changes detected for {} since {}, determining bump type", chart, tag);
        let mut messages = Vec::new();
        for commit in self.git.commits_since(&tag, chart_dir)? {
            messages.push(self.git.commit_message(&commit)?);
        }
        let bump = classify(self.labels, &messages).await;
        tracing::info!("Determined bump type: {}", bump);

        let metadata = ChartMetadata::from_file(&chart_yaml)?;
        let recorded = metadata.version.as_deref();
        let base = base_version(recorded.and_then(parse_release_version).as_ref(), &tagged);
        if base != tagged {
            tracing::info!("Using {} version as base for bump: {}", CHART_FILE, base);
        }
        let target = bump.apply(&base);

        // Lenient parse so pre-release versions are never downgraded
        if let Some(current) = recorded.and_then(|v| Version::parse(v).ok()) {
            if current >= target {
                tracing::info!(
                    "{} already at version {} >= target {}, skipping update.",
                    chart,
                    current,
                    target
                );
                self.report(
                    chart,
                    &format!(
                        "Already at version {} >= target {}, skipping version bump.",
                        current, target
                    ),
                );
                return Ok(ChartStatus::UpToDate { current, target });
            }
        }

        if self.config.pr_mode {
            self.report(chart, &format!("Bump type: {} - New version: {}", bump, target));
            return Ok(ChartStatus::Proposed {
                bump,
                from: base,
                to: target,
            });
        }

        tracing::info!("Updating chart version in {} to {}", chart_yaml.display(), target);
        write_chart_version(&chart_yaml, &target)?;
        self.git.add(&chart_yaml)?;

        let message = format!(
            "[skip ci] Robot commit: Bumping chart version for {} to {}",
            chart, target
        );
        let committed = match self.git.commit(&message) {
            Ok(()) => {
                tracing::info!("Version bump commit created for {}", chart);
                true
            }
            Err(e) => {
                tracing::warn!("Git commit failed (possibly no changes); continuing. {}", e);
                false
            }
        };

        Ok(ChartStatus::Bumped {
            bump,
            from: base,
            to: target,
            committed,
        })
    }
}
