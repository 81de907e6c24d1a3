// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::constants::*;
use crate::fixtures::infrastructure::TestProject;
use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn exit_code_for_help() {
    Command::cargo_bin(RUN_BIN)
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: run"))
        .stdout(predicate::str::contains("--no-format"));
}

#[test]
fn exit_code_for_invalid_argument() {
    Command::cargo_bin(RUN_BIN)
        .unwrap()
        .arg("--verbose")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: unexpected argument"));
}

#[test]
fn exit_code_for_positional_argument() {
    Command::cargo_bin(RUN_BIN)
        .unwrap()
        .arg("tests")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error: unexpected argument"));
}

#[test]
#[cfg(unix)]
fn exit_code_for_missing_build_tool() -> Result<()> {
    // The build command can't be started, so nothing else is attempted.
    let project = TestProject::empty()?;
    project.write_config("schema: 1.0\nbuild:\n  command: ./no-such-build-tool\n")?;
    project.write_test("test_add.c", "int main(void) { return 0; }\n")?;

    project
        .command()?
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[PASS]").not())
        .stderr(predicate::str::contains("testrun: Failed to run the build command"));
    assert!(!project.exists("tests/bin"));
    Ok(())
}

#[test]
#[cfg(has_executable_true)]
fn exit_code_for_no_tests() -> Result<()> {
    // An empty test directory is not a failure.
    let project = TestProject::empty()?;
    project.write_config(&format!("schema: 1.0\nbuild:\n  command: {TRUE_PATH}\n"))?;

    project
        .command()?
        .assert()
        .success()
        .stdout(predicate::str::contains("No tests found in"));
    assert!(project.exists("tests/build"));
    assert!(project.exists("tests/bin"));
    Ok(())
}

#[test]
#[cfg(has_executable_false)]
fn exit_code_for_failing_build() -> Result<()> {
    let project = TestProject::empty()?;
    project.write_config(&format!("schema: 1.0\nbuild:\n  command: {FALSE_PATH}\n"))?;
    project.write_test("test_add.c", "int main(void) { return 0; }\n")?;

    project.command()?.assert().code(1).stdout(predicate::str::contains("[PASS]").not());
    assert!(!project.exists("tests/build"));
    Ok(())
}

#[test]
#[cfg(has_executable_shell)]
fn exit_code_for_build_running_too_long() -> Result<()> {
    let project = TestProject::empty()?;
    project.write_config(&format!(
        "schema: 1.0\nbuild:\n  command: \"{SHELL_PATH} -c 'sleep 5; echo late'\"\n  timeout: 1\n"
    ))?;
    project.write_test("test_add.c", "int main(void) { return 0; }\n")?;

    let started = Instant::now();
    project
        .command()?
        .assert()
        .code(1)
        .stdout(predicate::str::contains("late").not())
        .stderr(predicate::str::contains("did not finish within 1s"));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!project.exists("tests/bin"));
    Ok(())
}

#[test]
#[cfg(all(has_executable_shell, has_executable_true))]
fn exit_code_for_compiler_running_too_long() -> Result<()> {
    // The compiler never finishes, so the test is reported as not built.
    let project = TestProject::empty()?;
    let compiler = project.write_script("slow-cc", "sleep 5\n")?;
    project.write_config(&format!(
        "schema: 1.0\nbuild:\n  command: {TRUE_PATH}\ncompiler:\n  path: {}\n  timeout: 1\n",
        compiler.display()
    ))?;
    project.write_test("test_add.c", "int main(void) { return 0; }\n")?;

    let started = Instant::now();
    project
        .command()?
        .arg("--no-format")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("An error occurred during compilation/linking:"))
        .stdout(predicate::str::contains("did not finish within 1s"))
        .stdout(predicate::str::contains("[PASS]").not());
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!project.exists("tests/bin/test_add.out"));
    Ok(())
}
