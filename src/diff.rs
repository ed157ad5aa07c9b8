//! Diff artifact generation for post-mortem inspection.
//!
//! On an expectation mismatch the harness materializes a unified diff of
//! expected vs. actual under `<case>/failure/`, overwriting whatever a prior
//! failing run left there. The artifact is a diagnostic, never a pass/fail
//! input, and is never cleaned up automatically.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use difference::{Changeset, Difference};

use crate::errors::HarnessError;
use crate::process::Stream;

/// Name of the per-case directory diff artifacts land in.
pub const FAILURE_DIR: &str = "failure";

/// Context lines kept on each side of a change within a hunk.
const CONTEXT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Context,
    Remove,
    Add,
}

/// One line of the flattened changeset.
struct Op {
    kind: OpKind,
    line: String,
}

/// Write the diff for one mismatched stream and return the artifact path.
///
/// The `failure/` directory is created on demand and an existing artifact is
/// truncated, so repeated failing runs never accumulate stale content.
pub fn write_artifact(
    case_dir: &Path,
    stream: Stream,
    expected: &[u8],
    actual: &[u8],
) -> Result<PathBuf, HarnessError> {
    let failure_dir = case_dir.join(FAILURE_DIR);
    fs::create_dir_all(&failure_dir).map_err(|source| HarnessError::Io {
        action: "create",
        path: failure_dir.clone(),
        source,
    })?;

    let rendered = render_unified_diff(
        &String::from_utf8_lossy(expected),
        &String::from_utf8_lossy(actual),
    );
    let path = failure_dir.join(stream.diff_file_name());
    fs::write(&path, rendered).map_err(|source| HarnessError::Io {
        action: "write",
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Render a line-based unified diff: `---`/`+++` headers, `@@` hunk markers
/// with up to [`CONTEXT`] context lines per side, lines joined by newlines.
pub fn render_unified_diff(expected: &str, actual: &str) -> String {
    let ops = line_ops(expected, actual);
    let mut out = vec!["--- expected".to_string(), "+++ actual".to_string()];
    for hunk in hunk_ranges(&ops) {
        render_hunk(&ops, hunk, &mut out);
    }
    out.join("\n")
}

/// Flatten the changeset's line blocks into one operation per line.
fn line_ops(expected: &str, actual: &str) -> Vec<Op> {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut ops = Vec::new();
    for diff in &changeset.diffs {
        let (kind, block) = match diff {
            Difference::Same(block) => (OpKind::Context, block),
            Difference::Rem(block) => (OpKind::Remove, block),
            Difference::Add(block) => (OpKind::Add, block),
        };
        for line in block.lines() {
            ops.push(Op {
                kind,
                line: line.to_string(),
            });
        }
    }
    ops
}

/// Group changed lines into hunks, merging hunks whose context overlaps.
fn hunk_ranges(ops: &[Op]) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        if op.kind == OpKind::Context {
            continue;
        }
        let start = i.saturating_sub(CONTEXT);
        let end = (i + CONTEXT + 1).min(ops.len());
        match ranges.last_mut() {
            Some(last) if start <= last.end => last.end = end,
            _ => ranges.push(start..end),
        }
    }
    ranges
}

fn render_hunk(ops: &[Op], range: Range<usize>, out: &mut Vec<String>) {
    let old_start = ops[..range.start]
        .iter()
        .filter(|op| op.kind != OpKind::Add)
        .count();
    let new_start = ops[..range.start]
        .iter()
        .filter(|op| op.kind != OpKind::Remove)
        .count();
    let old_count = ops[range.clone()]
        .iter()
        .filter(|op| op.kind != OpKind::Add)
        .count();
    let new_count = ops[range.clone()]
        .iter()
        .filter(|op| op.kind != OpKind::Remove)
        .count();
    out.push(format!(
        "@@ -{} +{} @@",
        format_range(old_start, old_count),
        format_range(new_start, new_count)
    ));
    for op in &ops[range] {
        let marker = match op.kind {
            OpKind::Context => ' ',
            OpKind::Remove => '-',
            OpKind::Add => '+',
        };
        out.push(format!("{marker}{}", op.line));
    }
}

/// Format one side of a hunk header. Starts are 0-based internally and
/// printed 1-based; a length of one is printed bare and an empty range
/// points at the line before it, per unified-diff conventions.
fn format_range(start: usize, count: usize) -> String {
    match count {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{}", start + 1, count),
    }
}
