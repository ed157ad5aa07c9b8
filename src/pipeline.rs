//! Pipeline orchestration: the linear, fail-fast stage machine per case.
//!
//! The success path runs three dependent stages, each blocking until done:
//! compile the fixture source to C, native-compile the C to an executable,
//! then run the executable. The compiler-failure path runs the compile stage
//! alone and requires it to fail. All stage artifacts use fixed relative
//! names (`main.c`, `a.out`); isolation comes from the per-case working
//! directory, never from unique filenames.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::HarnessError;
use crate::process::{run_stage, StageOutput, Stream};

/// Name of the intermediate C file the compiler writes into the workdir.
pub const GENERATED_C: &str = "main.c";
/// Name of the executable the native compiler produces.
pub const BUILT_BINARY: &str = "a.out";
/// Subdirectory created in every fresh workdir before any stage runs.
pub const OUTPUT_DIR: &str = "output";

/// One subprocess invocation within a case's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Compile,
    NativeCompile,
    Execute,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => write!(f, "compile"),
            Stage::NativeCompile => write!(f, "native-compile"),
            Stage::Execute => write!(f, "execute"),
        }
    }
}

/// Fixture category, also the subdirectory name under the tests root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Success,
    CompilerFailure,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Success, Category::CompilerFailure];

    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::CompilerFailure => "compiler_failure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// The two external programs the harness drives.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// Compiler under test, invoked as `compiler <source> main.c`.
    pub compiler: PathBuf,
    /// Native C compiler, invoked as `cc main.c -o a.out`.
    pub cc: PathBuf,
}

impl Toolchain {
    pub fn new(compiler: impl Into<PathBuf>, cc: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
            cc: cc.into(),
        }
    }

    /// Absolutize relative program paths.
    ///
    /// Stages run with the per-case workdir as their current directory, so a
    /// path like `build/compiler` must be pinned to the invocation directory
    /// up front. Bare names (`cc`, `gcc`) stay as-is for PATH lookup.
    pub fn resolved(&self) -> Result<Toolchain, HarnessError> {
        Ok(Toolchain {
            compiler: resolve_program(&self.compiler)?,
            cc: resolve_program(&self.cc)?,
        })
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain::new("build/compiler", "cc")
    }
}

fn resolve_program(path: &Path) -> Result<PathBuf, HarnessError> {
    if path.is_absolute() || path.components().count() == 1 {
        return Ok(path.to_path_buf());
    }
    fs::canonicalize(path).map_err(|source| HarnessError::Io {
        action: "resolve",
        path: path.to_path_buf(),
        source,
    })
}

/// Create the fixed-name `output` subdirectory a fresh workdir must carry
/// before the first stage runs.
pub fn prepare_workdir(workdir: &Path) -> Result<(), HarnessError> {
    let output = workdir.join(OUTPUT_DIR);
    fs::create_dir_all(&output).map_err(|source| HarnessError::Io {
        action: "create",
        path: output,
        source,
    })
}

/// Run the three-stage success pipeline and return the executable's output,
/// which is the comparison target for this category.
pub fn run_success(
    toolchain: &Toolchain,
    source: &Path,
    workdir: &Path,
) -> Result<StageOutput, HarnessError> {
    let out = run_stage(
        Stage::Compile,
        &toolchain.compiler,
        [source.as_os_str(), GENERATED_C.as_ref()],
        workdir,
    )?;
    require_exit_zero(Stage::Compile, &out)?;
    require_silent(Stage::Compile, Stream::Stdout, &out)?;
    // Compiler stderr is deliberately left unchecked on this path: warnings
    // are a permitted diagnostic channel.

    let out = run_stage(
        Stage::NativeCompile,
        &toolchain.cc,
        [GENERATED_C, "-o", BUILT_BINARY],
        workdir,
    )?;
    require_exit_zero(Stage::NativeCompile, &out)?;
    require_silent(Stage::NativeCompile, Stream::Stdout, &out)?;
    require_silent(Stage::NativeCompile, Stream::Stderr, &out)?;

    let out = run_stage(
        Stage::Execute,
        workdir.join(BUILT_BINARY),
        Vec::<&str>::new(),
        workdir,
    )?;
    require_exit_zero(Stage::Execute, &out)?;
    Ok(out)
}

/// Run the single-stage compiler-failure pipeline and return the compiler's
/// output, which is the comparison target for this category.
///
/// Nothing is native-compiled or executed: the point is verifying that the
/// compiler rejects the fixture and emits the recorded diagnostics.
pub fn run_compiler_failure(
    toolchain: &Toolchain,
    source: &Path,
    workdir: &Path,
) -> Result<StageOutput, HarnessError> {
    let out = run_stage(
        Stage::Compile,
        &toolchain.compiler,
        [source.as_os_str(), GENERATED_C.as_ref()],
        workdir,
    )?;
    if out.status == 0 {
        return Err(HarnessError::ExpectedCompileFailure);
    }
    Ok(out)
}

fn require_exit_zero(stage: Stage, out: &StageOutput) -> Result<(), HarnessError> {
    if out.status != 0 {
        return Err(HarnessError::StageFailed {
            stage,
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }
    Ok(())
}

fn require_silent(stage: Stage, stream: Stream, out: &StageOutput) -> Result<(), HarnessError> {
    let content = out.stream(stream);
    if !content.is_empty() {
        return Err(HarnessError::UnexpectedStreamOutput {
            stage,
            stream,
            content: String::from_utf8_lossy(content).into_owned(),
        });
    }
    Ok(())
}
