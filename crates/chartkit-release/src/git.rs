//! git CLI wrapper

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ReleaseError, Result};

/// Check whether `git` is on PATH
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Runs git commands inside one repository
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository containing `dir`, via `git rev-parse --show-toplevel`
    pub fn discover(dir: &Path) -> Result<Self> {
        let toplevel = Git::new(dir).run(&["rev-parse", "--show-toplevel"])?;
        Ok(Self::new(toplevel))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git and return trimmed stdout; non-zero exit is an error carrying stderr
    pub fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(args = ?args, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ReleaseError::GitNotFound,
                _ => ReleaseError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ReleaseError::Git {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn lines(&self, args: &[&str]) -> Result<Vec<String>> {
        Ok(self
            .run(args)?
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Path as given to git: relative to the repository root when possible
    fn pathspec(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    pub fn fetch_tags(&self) -> Result<()> {
        self.run(&["fetch", "--tags"]).map(|_| ())
    }

    /// Tags matching a glob pattern
    pub fn tags(&self, pattern: &str) -> Result<Vec<String>> {
        self.lines(&["tag", "-l", pattern])
    }

    /// Files under `path` changed between `tag` and HEAD
    pub fn changed_files_since(&self, tag: &str, path: &Path) -> Result<Vec<String>> {
        let range = format!("{}..HEAD", tag);
        let spec = self.pathspec(path);
        self.lines(&["diff", "--name-only", &range, "--", &spec])
    }

    /// Commits touching `path` between `tag` and HEAD, newest first
    pub fn commits_since(&self, tag: &str, path: &Path) -> Result<Vec<String>> {
        let range = format!("{}..HEAD", tag);
        let spec = self.pathspec(path);
        self.lines(&["log", "--format=%H", &range, "--", &spec])
    }

    /// Full message of a commit
    pub fn commit_message(&self, commit: &str) -> Result<String> {
        self.run(&["log", "--format=%B", "-n", "1", commit])
    }

    pub fn add(&self, path: &Path) -> Result<()> {
        let spec = self.pathspec(path);
        self.run(&["add", "--", &spec]).map(|_| ())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message]).map(|_| ())
    }

    /// Branch checked out at HEAD
    pub fn current_branch(&self) -> Result<String> {
        self.run(&["symbolic-ref", "--short", "HEAD"])
    }

    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("HEAD:{}", branch);
        self.run(&["push", remote, &refspec]).map(|_| ())
    }
}
