//! Validate-yaml command - parse every YAML file under a directory

use std::path::Path;

use chartkit_core::yaml::{find_yaml_files, validate_files};
use console::style;

use crate::error::{CliError, Result};

pub fn run(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(CliError::validation(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let files = find_yaml_files(dir)?;
    if files.is_empty() {
        return Err(CliError::validation_with_help(
            format!("No YAML files found in {}", dir.display()),
            "render the charts into this directory first",
        ));
    }

    println!(
        "{} Validating {} YAML file(s) in {}",
        style("→").blue(),
        files.len(),
        dir.display()
    );

    let summary = validate_files(&files);
    for failure in &summary.failures {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            failure.path.display(),
            failure.message
        );
    }

    println!();
    if !summary.passed() {
        return Err(CliError::failed(format!(
            "YAML validation failed: {} of {} file(s) invalid",
            summary.failures.len(),
            summary.checked
        )));
    }
    println!(
        "{} All {} YAML file(s) are valid",
        style("✓").green().bold(),
        summary.checked
    );
    Ok(())
}
