//! Small helpers: run identifiers and per-run file locations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PackReviewError, Result};

/// Fresh run identifier (UUID v4)
pub fn generate_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Read the brief text from disk with a descriptive error when missing
pub fn read_brief(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(PackReviewError::Io {
            message: format!("Brief file not found: {}", path.display()),
        });
    }
    Ok(fs::read_to_string(path)?)
}

/// Create `<base>/<run_id>/` and return it
pub fn ensure_output_dir(base: &Path, run_id: &str) -> Result<PathBuf> {
    let out_dir = base.join(run_id);
    fs::create_dir_all(&out_dir)?;
    Ok(out_dir)
}
