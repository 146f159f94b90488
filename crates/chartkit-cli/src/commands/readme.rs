//! Readme command - regenerate the charts table

use std::path::PathBuf;

use chartkit_core::ReadmeConfig;
use chartkit_core::readme::update_readme;
use console::style;

use crate::ReadmeArgs;
use crate::error::{CliError, Result};

/// `docs/README.md` lives next to `charts/`
fn default_charts_dir(readme: &std::path::Path) -> PathBuf {
    let docs = readme.parent().unwrap_or(std::path::Path::new("."));
    let root = docs.parent().unwrap_or(std::path::Path::new("."));
    root.join("charts")
}

pub fn run(args: ReadmeArgs) -> Result<()> {
    if !args.readme.is_file() {
        return Err(CliError::validation(format!(
            "README not found: {}",
            args.readme.display()
        )));
    }
    let charts_dir = args
        .charts_dir
        .unwrap_or_else(|| default_charts_dir(&args.readme));
    let config = ReadmeConfig {
        repo_alias: args.repo_alias,
        repo_url: args.repo_url,
    };

    let count = update_readme(&args.readme, &charts_dir, &config)?;
    println!(
        "{} Updated {} with {} chart(s)",
        style("✓").green(),
        args.readme.display(),
        count
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_charts_dir() {
        assert_eq!(
            default_charts_dir(std::path::Path::new("repo/docs/README.md")),
            PathBuf::from("repo/charts")
        );
    }
}
