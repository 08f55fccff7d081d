//! I/O operations for reports.
//!
//! Reports are small, so writes go straight through `std::fs`.

use crate::error::Result;
use llm_health_core::TestResult;
use std::fs;
use std::path::Path;

/// Write rendered report text to `path`, creating parent directories.
pub fn write_report(contents: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Read results previously written as a JSON array.
pub fn read_results_json(path: impl AsRef<Path>) -> Result<Vec<TestResult>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
