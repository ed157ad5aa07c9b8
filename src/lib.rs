//! Gauntlet: an end-to-end test harness for source-to-C compiler toolchains.
//!
//! The harness drives three external collaborators through process
//! boundaries: the compiler under test, a native C compiler, and the freshly
//! built executable. Each test case is a fixture directory holding a source
//! file and recorded golden output; the harness runs the pipeline inside an
//! isolated temporary directory, compares captured output byte-for-byte
//! against the expectation, and writes diff artifacts on mismatch.
//!
//! # Architecture
//!
//! Data flows one way through four components:
//! 1. **Discovery** ([`discovery`]): enumerate test-case directories per
//!    category (`success`, `compiler_failure`).
//! 2. **Pipeline** ([`pipeline`], [`process`]): sequence the compile →
//!    native-compile → execute stages, fail-fast, blocking on each stage.
//! 3. **Comparison** ([`expectation`]): load golden stdout/stderr (missing
//!    files mean "expect nothing"), substitute the `{main}` placeholder for
//!    failure-category fixtures, compare exactly.
//! 4. **Diff artifacts** ([`diff`]): on mismatch, write a unified diff to
//!    `<case>/failure/{stdout,stderr}.diff` before the failure propagates.
//!
//! The [`harness`] module ties these together per test case and provides the
//! sequential driver plus colored reporting; [`cli`] exposes it all as the
//! `gauntlet` binary.

pub mod cli;
pub mod diff;
pub mod discovery;
pub mod errors;
pub mod expectation;
pub mod harness;
pub mod pipeline;
pub mod process;

pub use errors::HarnessError;
pub use harness::{CaseResult, HarnessConfig, RunReport, Summary};
pub use pipeline::{Category, Stage, Toolchain};
pub use process::{StageOutput, Stream};
