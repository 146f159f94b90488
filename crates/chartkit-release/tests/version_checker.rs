//! End-to-end version checker runs against throwaway git repositories
//!
//! Skipped when git is not installed.

use std::fs;
use std::path::PathBuf;

use chartkit_release::{
    Bump, ChartStatus, CheckerConfig, Git, StaticLabels, VersionChecker, git_available,
};
use semver::Version;
use tempfile::TempDir;

const CHART_YAML: &str = "apiVersion: v2\n\
name: demo\n\
description: Demo chart # keep me\n\
version: \"1.2.3\"\n\
appVersion: \"2.0\"\n";

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    remote: PathBuf,
    git: Git,
}

impl Fixture {
    fn new() -> Option<Self> {
        if !git_available() {
            eprintln!("git not installed, skipping");
            return None;
        }
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("repo");
        let remote = dir.path().join("remote.git");
        fs::create_dir_all(&root).unwrap();

        Git::new(dir.path())
            .run(&["init", "-q", "--bare", &remote.to_string_lossy()])
            .unwrap();

        let git = Git::new(&root);
        git.run(&["init", "-q"]).unwrap();
        git.run(&["config", "user.email", "ci@example.com"]).unwrap();
        git.run(&["config", "user.name", "CI"]).unwrap();
        git.run(&["config", "commit.gpgsign", "false"]).unwrap();
        git.run(&["remote", "add", "origin", &remote.to_string_lossy()])
            .unwrap();

        Some(Self {
            _dir: dir,
            root,
            remote,
            git,
        })
    }

    fn write(&self, path: &str, content: &str) {
        let path = self.root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn commit_all(&self, message: &str) {
        self.git.run(&["add", "."]).unwrap();
        self.git.commit(message).unwrap();
    }

    fn tag(&self, name: &str) {
        self.git.run(&["tag", name]).unwrap();
    }

    /// Chart `demo` released as `demo-1.2.3`, then changed by `message`
    fn released_and_changed(&self, message: &str) {
        self.write("charts/demo/Chart.yaml", CHART_YAML);
        self.write("charts/demo/values.yaml", "replicas: 1\n");
        self.commit_all("Initial chart");
        self.tag("demo-1.2.3");

        self.write("charts/demo/values.yaml", "replicas: 2\n");
        self.commit_all(message);
    }

    fn config(&self) -> CheckerConfig {
        CheckerConfig {
            repo_root: self.root.clone(),
            git_ref: Some("refs/heads/main".to_string()),
            ..Default::default()
        }
    }

    fn chart_yaml(&self) -> String {
        fs::read_to_string(self.root.join("charts/demo/Chart.yaml")).unwrap()
    }

    fn remote_ref_missing(&self, branch: &str) -> bool {
        Git::new(&self.remote)
            .run(&["rev-parse", "--verify", "--quiet", branch])
            .is_err()
    }

    fn remote_subject(&self, branch: &str) -> String {
        Git::new(&self.remote)
            .run(&["log", "-1", "--format=%s", branch])
            .unwrap()
    }
}

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

#[tokio::test]
async fn test_minor_bump_written_committed_and_pushed() {
    let Some(fx) = Fixture::new() else { return };
    fx.released_and_changed("Add replicas (#42)");
    let labels = StaticLabels::new().with(42, &["minor"]);

    let report = VersionChecker::new(fx.config(), Some(&labels))
        .run()
        .await
        .unwrap();

    assert_eq!(
        report.outcomes[0].status,
        ChartStatus::Bumped {
            bump: Bump::Minor,
            from: v("1.2.3"),
            to: v("1.3.0"),
            committed: true,
        }
    );
    assert_eq!(
        fx.chart_yaml(),
        CHART_YAML.replace("version: \"1.2.3\"", "version: \"1.3.0\"")
    );
    assert_eq!(report.pushed.as_deref(), Some("main"));
    assert_eq!(
        fx.remote_subject("main"),
        "[skip ci] Robot commit: Bumping chart version for demo to 1.3.0"
    );
}

#[tokio::test]
async fn test_major_label_across_commits() {
    let Some(fx) = Fixture::new() else { return };
    fx.released_and_changed("Feature (#42)");
    fx.write("charts/demo/templates/new.yaml", "kind: ConfigMap\n");
    fx.commit_all("Breaking change (#57)");
    let labels = StaticLabels::new().with(42, &["minor"]).with(57, &["major"]);

    let report = VersionChecker::new(fx.config(), Some(&labels))
        .run()
        .await
        .unwrap();

    assert!(matches!(
        report.outcomes[0].status,
        ChartStatus::Bumped { bump: Bump::Major, ref to, .. } if *to == v("2.0.0")
    ));
}

#[tokio::test]
async fn test_pr_mode_reports_without_writing() {
    let Some(fx) = Fixture::new() else { return };
    fx.released_and_changed("Tweak (#7)");
    let summary = fx.root.join("summary.md");
    let config = CheckerConfig {
        pr_mode: true,
        step_summary: Some(summary.clone()),
        ..fx.config()
    };
    let head_before = fx.git.run(&["rev-parse", "HEAD"]).unwrap();

    let report = VersionChecker::new(config, None).run().await.unwrap();

    assert_eq!(
        report.outcomes[0].status,
        ChartStatus::Proposed {
            bump: Bump::Patch,
            from: v("1.2.3"),
            to: v("1.2.4"),
        }
    );
    assert_eq!(fx.chart_yaml(), CHART_YAML);
    assert_eq!(fx.git.run(&["rev-parse", "HEAD"]).unwrap(), head_before);
    assert!(report.pushed.is_none());
    assert_eq!(
        fs::read_to_string(summary).unwrap(),
        "- Chart: demo - Bump type: patch - New version: 1.2.4\n"
    );
}

#[tokio::test]
async fn test_pr_mode_without_summary_file() {
    let Some(fx) = Fixture::new() else { return };
    fx.released_and_changed("Tweak (#7)");
    let config = CheckerConfig {
        pr_mode: true,
        ..fx.config()
    };

    let report = VersionChecker::new(config, None).run().await.unwrap();

    assert!(matches!(report.outcomes[0].status, ChartStatus::Proposed { .. }));
    assert_eq!(fx.chart_yaml(), CHART_YAML);
    assert!(!fx.root.join("summary.md").exists());
}

#[tokio::test]
async fn test_recorded_version_ahead_of_tag_is_base() {
    let Some(fx) = Fixture::new() else { return };
    fx.write("charts/demo/Chart.yaml", CHART_YAML);
    fx.commit_all("Initial chart");
    fx.tag("demo-1.0.0");
    fx.write("charts/demo/values.yaml", "a: 1\n");
    fx.commit_all("Change");

    let report = VersionChecker::new(fx.config(), None).run().await.unwrap();
    assert!(matches!(
        report.outcomes[0].status,
        ChartStatus::Bumped { ref from, ref to, .. } if *from == v("1.2.3") && *to == v("1.2.4")
    ));
}

#[tokio::test]
async fn test_skips_are_reported_and_nothing_pushed() {
    let Some(fx) = Fixture::new() else { return };
    // Released with no later changes
    fx.write("charts/stable/Chart.yaml", "apiVersion: v2\nname: stable\nversion: 0.1.0\n");
    // Never released
    fx.write("charts/fresh/Chart.yaml", "apiVersion: v2\nname: fresh\nversion: 0.1.0\n");
    // Not a chart
    fx.write("charts/notes/README.md", "notes\n");
    fx.commit_all("Initial");
    fx.tag("stable-0.1.0");

    let report = VersionChecker::new(fx.config(), None).run().await.unwrap();

    let statuses: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| (o.chart.as_str(), o.status.clone()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("fresh", ChartStatus::NoTag),
            ("notes", ChartStatus::MissingChartFile),
            (
                "stable",
                ChartStatus::Unchanged {
                    tag: "stable-0.1.0".to_string()
                }
            ),
        ]
    );
    assert!(report.pushed.is_none());
    assert!(fx.remote_ref_missing("main"));
}

#[tokio::test]
async fn test_prerelease_recorded_version_never_downgraded() {
    let Some(fx) = Fixture::new() else { return };
    fx.write("charts/demo/Chart.yaml", "apiVersion: v2\nname: demo\nversion: 2.0.0-rc.1\n");
    fx.commit_all("Initial chart");
    fx.tag("demo-1.0.0");
    fx.write("charts/demo/values.yaml", "a: 1\n");
    fx.commit_all("Change");

    let report = VersionChecker::new(fx.config(), None).run().await.unwrap();
    assert_eq!(
        report.outcomes[0].status,
        ChartStatus::UpToDate {
            current: v("2.0.0-rc.1"),
            target: v("1.0.1"),
        }
    );
    assert!(fx.chart_yaml().contains("version: 2.0.0-rc.1"));
}
