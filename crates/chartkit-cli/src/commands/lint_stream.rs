//! Lint-stream command - validate one multi-document YAML stream

use std::path::Path;

use chartkit_core::StreamReport;
use chartkit_core::yaml::validate_stream;
use console::style;

use crate::commands::read_input;
use crate::error::{CliError, Result};

pub fn run(file: Option<&Path>) -> Result<()> {
    let source = file.unwrap_or(Path::new("-"));
    let content = read_input(source)?;
    let label = if source == Path::new("-") {
        "<stdin>".to_string()
    } else {
        source.display().to_string()
    };

    match validate_stream(&content) {
        StreamReport::Valid { documents } => {
            println!(
                "{} {}: {} document(s) parsed",
                style("✓").green(),
                label,
                documents
            );
            Ok(())
        }
        StreamReport::Empty => {
            println!(
                "{} {}: no non-empty YAML documents",
                style("⚠").yellow(),
                label
            );
            Ok(())
        }
        StreamReport::Invalid { message } => Err(CliError::failed(format!(
            "YAML parse error in {}: {}",
            label, message
        ))),
    }
}
