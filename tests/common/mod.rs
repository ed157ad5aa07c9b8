//! Shared fixtures for integration tests: a sandboxed tests root plus
//! shell-script stand-ins for the compiler and the native C compiler.
//!
//! The fake compiler copies the fixture source to the requested C file, and
//! the fake `cc` copies that file to the requested executable and marks it
//! runnable. Fixture sources are therefore small shell scripts, which keeps
//! every scenario hermetic: no real toolchain is ever invoked.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use gauntlet::{Category, HarnessConfig, Toolchain};

pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        for category in Category::ALL {
            fs::create_dir_all(dir.path().join("cases").join(category.dir_name())).unwrap();
        }
        Sandbox { dir }
    }

    pub fn tests_root(&self) -> PathBuf {
        self.dir.path().join("cases")
    }

    pub fn config(&self, compiler: PathBuf, cc: PathBuf) -> HarnessConfig {
        HarnessConfig {
            tests_root: self.tests_root(),
            toolchain: Toolchain::new(compiler, cc),
            source_ext: "src".to_string(),
            filter: None,
            use_colors: false,
        }
    }

    /// Compiler stand-in: `compiler <source> <c-file>` copies source to C.
    pub fn passing_compiler(&self) -> PathBuf {
        self.script("compiler", "cp \"$1\" \"$2\"")
    }

    /// Compiler stand-in that also warns on stderr, which the success path
    /// must tolerate.
    pub fn warning_compiler(&self) -> PathBuf {
        self.script(
            "compiler",
            "echo 'warning: unused variable' >&2\ncp \"$1\" \"$2\"",
        )
    }

    /// Compiler stand-in that chatters on stdout, which the success path
    /// must not tolerate.
    pub fn chatty_compiler(&self) -> PathBuf {
        self.script("compiler", "echo 'compiling...'\ncp \"$1\" \"$2\"")
    }

    /// Compiler stand-in that rejects everything, echoing the source path in
    /// its diagnostic, exit status 2.
    pub fn rejecting_compiler(&self) -> PathBuf {
        self.script(
            "compiler",
            "echo \"error in $1: syntax error\" >&2\nexit 2",
        )
    }

    /// Compiler stand-in that fails with no diagnostics.
    pub fn crashing_compiler(&self) -> PathBuf {
        self.script("compiler", "exit 1")
    }

    /// Native compiler stand-in: `cc <c-file> -o <binary>` copies and marks
    /// executable. `$3` is the argument after `-o`.
    pub fn passing_cc(&self) -> PathBuf {
        self.script("cc", "cp \"$1\" \"$3\"\nchmod +x \"$3\"")
    }

    /// Native compiler stand-in that warns on stderr, which is anomalous.
    pub fn noisy_cc(&self) -> PathBuf {
        self.script(
            "cc",
            "echo 'warning: implicit declaration' >&2\ncp \"$1\" \"$3\"\nchmod +x \"$3\"",
        )
    }

    /// Create a fixture directory whose `main.src` is the given shell body.
    pub fn add_case(&self, category: Category, name: &str, source_body: &str) -> PathBuf {
        let case_dir = self.tests_root().join(category.dir_name()).join(name);
        fs::create_dir_all(&case_dir).unwrap();
        fs::write(
            case_dir.join("main.src"),
            format!("#!/bin/sh\n{source_body}\n"),
        )
        .unwrap();
        case_dir
    }

    /// Record a golden expectation for one stream of a fixture.
    pub fn expect(&self, case_dir: &Path, stream: &str, content: &str) {
        let expected_dir = case_dir.join("expected");
        fs::create_dir_all(&expected_dir).unwrap();
        fs::write(expected_dir.join(stream), content).unwrap();
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join("bin").join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }
}
