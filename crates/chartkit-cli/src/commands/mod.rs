//! CLI commands

pub mod bump;
pub mod lint_stream;
pub mod provision;
pub mod readme;
pub mod render;
pub mod split;
pub mod validate;

use std::io::Read;
use std::path::Path;

use crate::error::{CliError, Result};

/// Read `path`, or stdin for `-`
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    if !path.is_file() {
        return Err(CliError::validation(format!(
            "File not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}
