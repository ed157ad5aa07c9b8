//! Unified error type for the harness.
//!
//! Every failure mode a test case can hit is a variant of [`HarnessError`],
//! surfaced through miette with a stable diagnostic code. All failures are
//! local to one test case: the driver records them and moves on, there is no
//! global abort.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::pipeline::Stage;
use crate::process::Stream;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// Filesystem-level failure outside any pipeline stage.
    #[error("failed to {action} {}: {source}", .path.display())]
    #[diagnostic(code(harness::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Test-case enumeration failed, usually a missing category root.
    #[error("failed to walk test directory {}: {message}", .path.display())]
    #[diagnostic(
        code(harness::discovery),
        help("the category root must exist; each immediate subdirectory is one test case")
    )]
    Discovery { path: PathBuf, message: String },

    /// A stage that must succeed exited non-zero.
    #[error("{stage} stage exited with status {status} (expected 0)")]
    #[diagnostic(code(harness::stage::status))]
    StageFailed {
        stage: Stage,
        status: i32,
        /// Captured stderr, kept for the report even when the stage is
        /// permitted to write diagnostics there.
        stderr: String,
    },

    /// The compiler accepted a fixture that must be rejected.
    #[error("compiler exited with status 0 but the fixture expects a compile failure")]
    #[diagnostic(
        code(harness::stage::unexpected_success),
        help("compiler_failure fixtures verify rejection; the compiler must exit non-zero")
    )]
    ExpectedCompileFailure,

    /// A stream that must stay silent carried output.
    #[error("{stage} stage wrote unexpected output to {stream}")]
    #[diagnostic(
        code(harness::stage::output),
        help("output on this stream signals a toolchain anomaly, not a fixture mismatch")
    )]
    UnexpectedStreamOutput {
        stage: Stage,
        stream: Stream,
        content: String,
    },

    /// A stage's child process died to a signal and has no exit code.
    #[error("{stage} stage was terminated by a signal")]
    #[diagnostic(code(harness::stage::signal))]
    Signaled { stage: Stage },

    /// Waiting on a spawned stage failed at the OS level.
    #[error("failed waiting on {stage} stage: {source}")]
    #[diagnostic(code(harness::stage::wait))]
    Wait {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// Captured output differed from the recorded expectation. The diff
    /// artifact is already on disk by the time this is constructed.
    #[error("{stream} did not match the recorded expectation")]
    #[diagnostic(
        code(harness::mismatch),
        help("inspect the diff artifact written next to the fixture")
    )]
    Mismatch { stream: Stream, diff_path: PathBuf },
}

impl HarnessError {
    /// Path of the diff artifact, for mismatch errors only.
    pub fn diff_path(&self) -> Option<&PathBuf> {
        match self {
            HarnessError::Mismatch { diff_path, .. } => Some(diff_path),
            _ => None,
        }
    }

    /// Pipeline stage the failure occurred in, where one applies.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            HarnessError::StageFailed { stage, .. }
            | HarnessError::UnexpectedStreamOutput { stage, .. }
            | HarnessError::Signaled { stage }
            | HarnessError::Wait { stage, .. } => Some(*stage),
            HarnessError::ExpectedCompileFailure => Some(Stage::Compile),
            _ => None,
        }
    }

    /// Output stream the failure concerns, where one applies.
    pub fn stream(&self) -> Option<Stream> {
        match self {
            HarnessError::UnexpectedStreamOutput { stream, .. }
            | HarnessError::Mismatch { stream, .. } => Some(*stream),
            _ => None,
        }
    }
}
