//! Render command - helm template harness

use chartkit_core::{HelmRenderer, RenderedChart, split_manifests};
use console::style;

use crate::RenderArgs;
use crate::error::{CliError, Result};

pub fn run(args: RenderArgs) -> Result<()> {
    if !args.chart.is_dir() {
        return Err(CliError::validation(format!(
            "Chart directory not found: {}",
            args.chart.display()
        )));
    }

    let mut renderer = HelmRenderer::new(&args.chart)
        .release(&args.release)
        .namespace(&args.namespace);
    if let Some(path) = &args.values {
        let content = std::fs::read_to_string(path)?;
        let values: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
            CliError::validation(format!("Invalid values file {}: {}", path.display(), e))
        })?;
        renderer = renderer.values(values);
    }

    let rendered = renderer.render()?;

    if let Some(out_dir) = &args.output_dir {
        let written = split_manifests(&rendered.raw, out_dir)?;
        println!(
            "{} Wrote {} manifest(s) to {}",
            style("✓").green().bold(),
            written.len(),
            out_dir.display()
        );
        return Ok(());
    }

    if rendered.is_empty() {
        println!("{} No documents rendered", style("⚠").yellow());
        return Ok(());
    }
    for doc in &rendered.documents {
        let kind = doc.get("kind").and_then(|k| k.as_str()).unwrap_or("<none>");
        let name = RenderedChart::name_of(doc).unwrap_or("<unnamed>");
        println!("{}/{}", kind, name);
    }
    Ok(())
}
