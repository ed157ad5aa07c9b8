//! Thin uniform wrapper around subprocess stages.
//!
//! Every pipeline stage goes through the same launch path: stdin bound to an
//! inert source, stdout/stderr captured in full, a blocking wait yielding an
//! integer exit status. Non-zero statuses are never swallowed here; asserting
//! on them is the orchestrator's job.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use serde::Serialize;

use crate::errors::HarnessError;
use crate::pipeline::Stage;

/// One of the two captured output channels of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// Fixed artifact name under a case's `failure/` directory.
    pub fn diff_file_name(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout.diff",
            Stream::Stderr => "stderr.diff",
        }
    }

    /// Fixed expectation file name under a case's `expected/` directory.
    pub fn expected_file_name(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Exit status plus fully captured output of one completed stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl StageOutput {
    pub fn stream(&self, stream: Stream) -> &[u8] {
        match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        }
    }
}

/// A launched but not yet awaited stage.
pub struct StageHandle {
    stage: Stage,
    child: Child,
}

impl StageHandle {
    /// Block until the stage completes and return its status and captured
    /// streams. A signal-terminated child has no exit status and is an error.
    pub fn wait(self) -> Result<StageOutput, HarnessError> {
        let stage = self.stage;
        let output = self
            .child
            .wait_with_output()
            .map_err(|source| HarnessError::Wait { stage, source })?;
        let status = output
            .status
            .code()
            .ok_or(HarnessError::Signaled { stage })?;
        Ok(StageOutput {
            status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Launch a stage with stdin null and both output streams piped for capture.
pub fn spawn_stage<I, S>(
    stage: Stage,
    program: impl AsRef<OsStr>,
    args: I,
    workdir: &Path,
) -> Result<StageHandle, HarnessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program.as_ref())
        .args(args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| HarnessError::Io {
            action: "spawn",
            path: PathBuf::from(program.as_ref()),
            source,
        })?;
    Ok(StageHandle { stage, child })
}

/// Launch a stage and block until completion. Stages never overlap: each one
/// is waited to the end before the orchestrator decides on the next.
pub fn run_stage<I, S>(
    stage: Stage,
    program: impl AsRef<OsStr>,
    args: I,
    workdir: &Path,
) -> Result<StageOutput, HarnessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    spawn_stage(stage, program, args, workdir)?.wait()
}
