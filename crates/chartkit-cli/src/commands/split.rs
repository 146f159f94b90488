//! Split command - one file per rendered template

use std::path::Path;

use chartkit_core::split_manifests;
use console::style;

use crate::commands::read_input;
use crate::error::Result;

pub fn run(input: &Path, out_dir: &Path) -> Result<()> {
    let content = read_input(input)?;
    let written = split_manifests(&content, out_dir)?;

    for path in &written {
        println!("  {} {}", style("✓").green(), path.display());
    }
    println!(
        "{} Wrote {} manifest(s) to {}",
        style("✓").green().bold(),
        written.len(),
        out_dir.display()
    );
    Ok(())
}
