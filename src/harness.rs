//! Per-case execution driver, result types, and reporting.
//!
//! Each test case runs as an independent, sequential unit inside a fresh
//! temporary working directory. Stage violations abort the case immediately;
//! once the pipeline's final output is in hand, both stream comparisons are
//! always attempted so a stdout mismatch never suppresses the stderr diff.
//! There is no internal parallelism, no timeout, and no retry.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::discovery::discover_cases;
use crate::errors::HarnessError;
use crate::expectation::{compare_stream, load_case_expectation};
use crate::pipeline::{self, Category, Stage, Toolchain};
use crate::process::Stream;

/// Harness-wide configuration, normally assembled by the CLI.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory holding the `success/` and `compiler_failure/` category roots.
    pub tests_root: PathBuf,
    pub toolchain: Toolchain,
    /// Extension of the fixture source file, `main.<ext>`.
    pub source_ext: String,
    /// Substring filter on case names; non-matching cases are skipped.
    pub filter: Option<String>,
    pub use_colors: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tests_root: PathBuf::from("tests/e2e"),
            toolchain: Toolchain::default(),
            source_ext: "src".to_string(),
            filter: None,
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl HarnessConfig {
    /// Fixture source file name, fixed apart from the extension.
    pub fn source_file_name(&self) -> String {
        format!("main.{}", self.source_ext)
    }
}

/// Verdict for one test case.
#[derive(Debug)]
pub enum CaseResult {
    Pass {
        category: Category,
        name: String,
    },
    Fail {
        category: Category,
        name: String,
        /// Everything that went wrong: one stage violation, or up to two
        /// stream mismatches collected in the same run.
        errors: Vec<HarnessError>,
    },
    Skipped {
        category: Category,
        name: String,
        reason: String,
    },
}

/// Aggregate counts for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Machine-readable record of a whole run: one entry per case plus totals.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub cases: Vec<CaseReport>,
    pub summary: Summary,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub category: Category,
    pub name: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    Skip,
}

/// One failure of a case, flattened for the JSON report.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<Stream>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<PathBuf>,
}

impl FailureReport {
    fn from_error(error: &HarnessError) -> Self {
        Self {
            message: error.to_string(),
            stage: error.stage(),
            stream: error.stream(),
            diff: error.diff_path().cloned(),
        }
    }
}

impl RunReport {
    pub fn new(results: &[CaseResult]) -> Self {
        let cases = results
            .iter()
            .map(|result| match result {
                CaseResult::Pass { category, name } => CaseReport {
                    category: *category,
                    name: name.clone(),
                    verdict: Verdict::Pass,
                    failures: Vec::new(),
                    skip_reason: None,
                },
                CaseResult::Fail {
                    category,
                    name,
                    errors,
                } => CaseReport {
                    category: *category,
                    name: name.clone(),
                    verdict: Verdict::Fail,
                    failures: errors.iter().map(FailureReport::from_error).collect(),
                    skip_reason: None,
                },
                CaseResult::Skipped {
                    category,
                    name,
                    reason,
                } => CaseReport {
                    category: *category,
                    name: name.clone(),
                    verdict: Verdict::Skip,
                    failures: Vec::new(),
                    skip_reason: Some(reason.clone()),
                },
            })
            .collect();
        Self {
            cases,
            summary: summarize(results),
        }
    }
}

/// Run one test case in a fresh temporary working directory.
pub fn run_case(config: &HarnessConfig, category: Category, name: &str) -> CaseResult {
    match execute_case(config, category, name) {
        Ok(()) => CaseResult::Pass {
            category,
            name: name.to_string(),
        },
        Err(errors) => CaseResult::Fail {
            category,
            name: name.to_string(),
            errors,
        },
    }
}

fn execute_case(
    config: &HarnessConfig,
    category: Category,
    name: &str,
) -> Result<(), Vec<HarnessError>> {
    let (case_dir, source) = resolve_case(config, category, name).map_err(|e| vec![e])?;
    let toolchain = config.toolchain.resolved().map_err(|e| vec![e])?;

    let workdir = tempfile::tempdir().map_err(|source| {
        vec![HarnessError::Io {
            action: "create",
            path: std::env::temp_dir(),
            source,
        }]
    })?;
    pipeline::prepare_workdir(workdir.path()).map_err(|e| vec![e])?;

    let final_output = match category {
        Category::Success => pipeline::run_success(&toolchain, &source, workdir.path()),
        Category::CompilerFailure => {
            pipeline::run_compiler_failure(&toolchain, &source, workdir.path())
        }
    }
    .map_err(|e| vec![e])?;

    let expectation = load_case_expectation(&case_dir, category, &source).map_err(|e| vec![e])?;

    // Both streams are compared even if the first mismatches, so one failing
    // run yields both diff artifacts.
    let mut errors = Vec::new();
    if let Err(e) = compare_stream(
        &case_dir,
        Stream::Stdout,
        &expectation.stdout,
        &final_output.stdout,
    ) {
        errors.push(e);
    }
    if let Err(e) = compare_stream(
        &case_dir,
        Stream::Stderr,
        &expectation.stderr,
        &final_output.stderr,
    ) {
        errors.push(e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Resolve the case directory to an absolute path and locate its source file.
///
/// The absolute source path matters twice: stages run with the workdir as
/// their current directory, and the `{main}` placeholder must substitute to
/// the literal path of this fixture's source.
fn resolve_case(
    config: &HarnessConfig,
    category: Category,
    name: &str,
) -> Result<(PathBuf, PathBuf), HarnessError> {
    let dir = config
        .tests_root
        .join(category.dir_name())
        .join(name);
    let dir = fs::canonicalize(&dir).map_err(|source| HarnessError::Io {
        action: "resolve",
        path: dir.clone(),
        source,
    })?;
    let source = dir.join(config.source_file_name());
    Ok((dir, source))
}

/// Discover and run every case in both categories, report, and summarize.
pub fn run_all(config: &HarnessConfig) -> Result<RunReport, HarnessError> {
    let mut results = Vec::new();
    for category in Category::ALL {
        let root = config.tests_root.join(category.dir_name());
        for name in discover_cases(&root)? {
            if let Some(filter) = config.filter.as_deref() {
                if !name.contains(filter) {
                    results.push(CaseResult::Skipped {
                        category,
                        name,
                        reason: format!("filtered out by substring: {filter}"),
                    });
                    continue;
                }
            }
            results.push(run_case(config, category, &name));
        }
    }
    report_results(&results, config);
    Ok(RunReport::new(&results))
}

pub fn summarize(results: &[CaseResult]) -> Summary {
    let passed = results
        .iter()
        .filter(|r| matches!(r, CaseResult::Pass { .. }))
        .count();
    let failed = results
        .iter()
        .filter(|r| matches!(r, CaseResult::Fail { .. }))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r, CaseResult::Skipped { .. }))
        .count();
    Summary {
        total: results.len(),
        passed,
        failed,
        skipped,
    }
}

/// Print one line per case plus a trailing summary, colored when enabled.
pub fn report_results(results: &[CaseResult], config: &HarnessConfig) {
    let choice = if config.use_colors {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    for result in results {
        match result {
            CaseResult::Pass { category, name } => {
                print_verdict(&mut stdout, "PASS", Color::Green);
                let _ = writeln!(stdout, ": {name} [{category}]");
            }
            CaseResult::Fail {
                category,
                name,
                errors,
            } => {
                print_verdict(&mut stdout, "FAIL", Color::Red);
                let _ = writeln!(stdout, ": {name} [{category}]");
                for error in errors {
                    let _ = writeln!(stdout, "  {error}");
                    match error {
                        HarnessError::StageFailed { stderr, .. } if !stderr.is_empty() => {
                            for line in stderr.lines() {
                                let _ = writeln!(stdout, "    {line}");
                            }
                        }
                        HarnessError::UnexpectedStreamOutput { content, .. } => {
                            for line in content.lines() {
                                let _ = writeln!(stdout, "    {line}");
                            }
                        }
                        _ => {}
                    }
                    if let Some(diff_path) = error.diff_path() {
                        let _ = writeln!(stdout, "  diff: {}", diff_path.display());
                    }
                }
            }
            CaseResult::Skipped {
                category,
                name,
                reason,
            } => {
                print_verdict(&mut stdout, "SKIP", Color::Yellow);
                let _ = writeln!(stdout, ": {name} [{category}] ({reason})");
            }
        }
    }

    let summary = summarize(results);
    let _ = writeln!(
        stdout,
        "\ne2e summary: total {}, passed {}, failed {}, skipped {}",
        summary.total, summary.passed, summary.failed, summary.skipped
    );

    if summary.failed > 0 {
        eprintln!("\nFailed cases:");
        for result in results {
            if let CaseResult::Fail { category, name, .. } = result {
                eprintln!("  - {category}/{name}");
            }
        }
    }
}

fn print_verdict(stdout: &mut StandardStream, verdict: &str, color: Color) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{verdict}");
    let _ = stdout.reset();
}
