//! Regression tests for the `gauntlet` binary surface.
//! Requires: assert_cmd, predicates crates in [dev-dependencies].

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::Sandbox;
use gauntlet::Category;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn gauntlet_cmd() -> Command {
    Command::cargo_bin("gauntlet").unwrap()
}

#[test]
fn list_prints_cases_per_category() {
    let sandbox = Sandbox::new();
    sandbox.add_case(Category::Success, "hello", "true");
    sandbox.add_case(Category::CompilerFailure, "bad_syntax", "true");

    gauntlet_cmd()
        .arg("list")
        .arg("--tests-root")
        .arg(sandbox.tests_root())
        .assert()
        .success()
        .stdout(
            contains("success:")
                .and(contains("  hello"))
                .and(contains("compiler_failure:"))
                .and(contains("  bad_syntax")),
        );
}

#[test]
fn run_exits_zero_and_reports_json_when_everything_passes() {
    let sandbox = Sandbox::new();
    let case = sandbox.add_case(Category::Success, "hello", "printf 'hello\\n'");
    sandbox.expect(&case, "stdout", "hello\n");

    gauntlet_cmd()
        .arg("run")
        .arg("--tests-root")
        .arg(sandbox.tests_root())
        .arg("--compiler")
        .arg(sandbox.passing_compiler())
        .arg("--cc")
        .arg(sandbox.passing_cc())
        .arg("--json")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(
            contains("PASS: hello [success]")
                .and(contains(r#""name":"hello","verdict":"pass""#))
                .and(contains(r#""passed":1"#))
                .and(contains(r#""failed":0"#)),
        );
}

#[test]
fn run_exits_nonzero_on_any_case_failure() {
    let sandbox = Sandbox::new();
    let case = sandbox.add_case(Category::Success, "casing", "printf 'hellO\\n'");
    sandbox.expect(&case, "stdout", "hello\n");

    gauntlet_cmd()
        .arg("run")
        .arg("--tests-root")
        .arg(sandbox.tests_root())
        .arg("--compiler")
        .arg(sandbox.passing_compiler())
        .arg("--cc")
        .arg(sandbox.passing_cc())
        .arg("--no-color")
        .assert()
        .code(1)
        .stdout(contains("FAIL: casing [success]"))
        .stderr(contains("success/casing"));
}

#[test]
fn run_reports_filtered_cases_as_skipped() {
    let sandbox = Sandbox::new();
    let case = sandbox.add_case(Category::Success, "hello", "printf 'hello\\n'");
    sandbox.expect(&case, "stdout", "hello\n");
    sandbox.add_case(Category::Success, "other", "true");

    gauntlet_cmd()
        .arg("run")
        .arg("--tests-root")
        .arg(sandbox.tests_root())
        .arg("--compiler")
        .arg(sandbox.passing_compiler())
        .arg("--cc")
        .arg(sandbox.passing_cc())
        .arg("--filter")
        .arg("hello")
        .arg("--no-color")
        .assert()
        .success()
        .stdout(contains("SKIP: other [success]").and(contains("passed 1")));
}

#[test]
fn run_fails_loudly_when_the_tests_root_is_missing() {
    let sandbox = Sandbox::new();
    gauntlet_cmd()
        .arg("run")
        .arg("--tests-root")
        .arg(sandbox.dir.path().join("nowhere"))
        .arg("--compiler")
        .arg(sandbox.passing_compiler())
        .assert()
        .failure()
        .stderr(contains("harness::discovery"));
}
