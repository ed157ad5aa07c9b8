//! Expectation loading and byte-for-byte comparison.
//!
//! Golden output lives next to the fixture as `expected/stdout` and
//! `expected/stderr`; a missing file is an implicit empty expectation, never
//! an error. Failure-category expectations may embed the `{main}` placeholder
//! standing for the case's own absolute source path, so one fixture can
//! assert path-dependent diagnostic text without hardcoding locations.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::diff;
use crate::errors::HarnessError;
use crate::pipeline::Category;
use crate::process::Stream;

/// Placeholder token substituted with the fixture's own source path.
pub const SOURCE_PATH_TOKEN: &str = "{main}";

/// The pair of golden byte sequences one case is judged against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Read an expectation file, defaulting to empty bytes when absent.
///
/// "No recorded expectation" and "recorded empty expectation" are the same
/// thing; any other IO failure still propagates.
pub fn load_expectation(path: &Path) -> Result<Vec<u8>, HarnessError> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(HarnessError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace every `{main}` token in expectation text with the source path.
pub fn substitute_source_path(expected: &[u8], source: &Path) -> Vec<u8> {
    let text = String::from_utf8_lossy(expected);
    text.replace(SOURCE_PATH_TOKEN, &source.display().to_string())
        .into_bytes()
}

/// Load both golden streams for a case, applying placeholder substitution on
/// the failure path only.
pub fn load_case_expectation(
    case_dir: &Path,
    category: Category,
    source: &Path,
) -> Result<Expectation, HarnessError> {
    let expected_dir = case_dir.join("expected");
    let mut stdout = load_expectation(&expected_dir.join(Stream::Stdout.expected_file_name()))?;
    let mut stderr = load_expectation(&expected_dir.join(Stream::Stderr.expected_file_name()))?;
    if category == Category::CompilerFailure {
        stdout = substitute_source_path(&stdout, source);
        stderr = substitute_source_path(&stderr, source);
    }
    Ok(Expectation { stdout, stderr })
}

/// Exact equality check for one stream. On mismatch the diff artifact is
/// written first, then the mismatch is reported, so the artifact always
/// lands even though the case is ultimately marked failed.
pub fn compare_stream(
    case_dir: &Path,
    stream: Stream,
    expected: &[u8],
    actual: &[u8],
) -> Result<(), HarnessError> {
    if expected == actual {
        return Ok(());
    }
    let diff_path = diff::write_artifact(case_dir, stream, expected, actual)?;
    Err(HarnessError::Mismatch { stream, diff_path })
}
