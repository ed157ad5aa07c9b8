//! Test-case discovery.
//!
//! A test case is one immediate subdirectory of a category root; its name is
//! the case identifier. Enumeration is non-recursive, skips plain files, and
//! is sorted so repeated runs over an unchanged tree see the same order.

use std::path::Path;

use walkdir::WalkDir;

use crate::errors::HarnessError;

/// List the immediate subdirectory names of `root`, sorted.
///
/// The root must exist; a missing or unreadable directory is an error rather
/// than an empty result, so a mistyped tests root cannot silently pass.
pub fn discover_cases(root: &Path) -> Result<Vec<String>, HarnessError> {
    let meta = std::fs::metadata(root).map_err(|e| HarnessError::Discovery {
        path: root.to_path_buf(),
        message: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(HarnessError::Discovery {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| HarnessError::Discovery {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
