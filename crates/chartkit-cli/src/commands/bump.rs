//! Bump command - chart version automation

use chartkit_release::{ChartStatus, CheckerConfig, Git, GitHubLabels, LabelSource, VersionChecker};
use console::style;

use crate::BumpArgs;
use crate::error::Result;

pub fn run(args: BumpArgs) -> Result<()> {
    let repo_root = match args.repo_root {
        Some(root) => root,
        None => Git::discover(&std::env::current_dir()?)?.root().to_path_buf(),
    };
    let pr_mode = args.pr_mode || args.event_name.as_deref() == Some("pull_request");
    let token = args
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()));

    let labels = match args.repository.as_deref().filter(|r| !r.is_empty()) {
        Some(repository) => Some(GitHubLabels::new(&args.api_url, repository, token.as_deref())?),
        None => {
            tracing::warn!("GITHUB_REPOSITORY not set, pull request labels will not be read");
            None
        }
    };

    let config = CheckerConfig {
        repo_root,
        charts_dir: args.charts_dir,
        pr_mode,
        step_summary: args.step_summary,
        git_ref: args.git_ref,
        ..Default::default()
    };

    let checker = VersionChecker::new(config, labels.as_ref().map(|l| l as &dyn LabelSource));
    let report = crate::runtime()?.block_on(checker.run())?;

    println!();
    for outcome in &report.outcomes {
        let marker = match outcome.status {
            ChartStatus::Bumped { committed: true, .. } | ChartStatus::Proposed { .. } => {
                style("✓").green()
            }
            ChartStatus::Bumped { .. } | ChartStatus::MissingChartFile | ChartStatus::NoTag => {
                style("⚠").yellow()
            }
            _ => style("·").dim(),
        };
        println!("{} {}", marker, outcome);
    }
    if let Some(branch) = &report.pushed {
        println!(
            "\n{} Pushed {} commit(s) to {}",
            style("✓").green().bold(),
            report.commits(),
            branch
        );
    }
    Ok(())
}
