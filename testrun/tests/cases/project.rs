// SPDX-License-Identifier: GPL-3.0-or-later

//! Runs against a real C project, built with `make`.

#![cfg(all(unix, has_executable_make, has_executable_compiler_c))]

use crate::fixtures::constants::*;
use crate::fixtures::infrastructure::TestProject;
use anyhow::Result;
use predicates::prelude::*;

const TEST_ADD: &str = "\
#include <stdio.h>
#include \"project.h\"

int main(void) {
    if (add(2, 3) != 5) {
        printf(\"expected 5, got %d\\n\", add(2, 3));
        return 1;
    }
    return 0;
}
";

const TEST_SUB_BROKEN_EXPECTATION: &str = "\
#include <stdio.h>
#include \"project.h\"

int main(void) {
    int result = sub(3, 1);
    if (result != 1) {
        printf(\"expected 1, got %d\\n\", result);
        return 1;
    }
    return 0;
}
";

#[test]
fn passing_test() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_test("test_add.c", TEST_ADD)?;

    project
        .command()?
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{PASS_COLORED} test_add.c passed...")));

    assert!(project.exists("build/project.o"));
    assert!(project.exists("tests/build/test_add.o"));
    assert!(project.exists("tests/bin/test_add.out"));
    Ok(())
}

#[test]
fn failing_test_fails_the_run() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_test("test_add.c", TEST_ADD)?;
    project.write_test("test_sub.c", TEST_SUB_BROKEN_EXPECTATION)?;

    project
        .command()?
        .assert()
        .code(1)
        .stdout(predicate::str::contains(format!("{PASS_COLORED} test_add.c passed...")))
        .stdout(predicate::str::contains(format!("{FAIL_COLORED} test_sub.c failed...\nexpected 1, got 2\n")));
    Ok(())
}

#[test]
fn plain_output() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_test("test_add.c", TEST_ADD)?;
    project.write_test("test_sub.c", TEST_SUB_BROKEN_EXPECTATION)?;

    project
        .command()?
        .arg("--no-format")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[PASS] test_add.c passed...\n[FAIL] test_sub.c failed..."))
        .stdout(predicate::str::contains("\x1b").not());
    Ok(())
}

#[test]
fn tests_run_in_file_name_order() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    for name in ["test_c.c", "test_a.c", "test_b.c"] {
        project.write_test(name, "int main(void) { return 0; }\n")?;
    }

    project
        .command()?
        .arg("--no-format")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[PASS] test_a.c passed...\n[PASS] test_b.c passed...\n[PASS] test_c.c passed...\n",
        ));
    Ok(())
}

#[test]
fn compilation_error_does_not_stop_the_run() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_test("test_add.c", TEST_ADD)?;
    project.write_test("test_broken.c", "int main(void) { return 0 }\n")?;

    project
        .command()?
        .arg("--no-format")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[PASS] test_add.c passed..."))
        .stdout(predicate::str::contains("An error occurred during compilation/linking:"))
        .stdout(predicate::str::contains("test_broken.c"));
    assert!(!project.exists("tests/bin/test_broken.out"));
    Ok(())
}

#[test]
fn entry_point_is_not_linked() -> Result<()> {
    // Linking `main.o` would give two `main` functions.
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_test("test_add.c", TEST_ADD)?;

    project.command()?.assert().success();

    assert!(project.exists("build/main.o"));
    Ok(())
}

#[test]
fn build_failure_stops_before_the_tests() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_files(&[("src/project.c", "int add(int a, int b) { return a + }\n")])?;
    project.write_test("test_add.c", TEST_ADD)?;

    project
        .command()?
        .assert()
        .code(1)
        .stdout(predicate::str::contains("project.c"))
        .stdout(predicate::str::contains("[PASS]").not());
    assert!(!project.exists("tests/build/test_add.o"));
    Ok(())
}

#[test]
fn test_running_too_long_times_out() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("tests:\n  timeout: 1\n")?;
    project.write_test("test_loop.c", "int main(void) { for (;;) {} }\n")?;
    project.write_test("test_add.c", TEST_ADD)?;

    project
        .command()?
        .arg("--no-format")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[PASS] test_add.c passed..."))
        .stdout(predicate::str::contains("[TIME] test_loop.c timed out after 1s..."));
    Ok(())
}

#[test]
fn repeated_runs_give_the_same_result() -> Result<()> {
    let project = TestProject::new()?;
    project.write_make_config("")?;
    project.write_test("test_add.c", TEST_ADD)?;

    for _ in 0..2 {
        project
            .command()?
            .arg("--no-format")
            .assert()
            .success()
            .stdout(predicate::str::contains("[PASS] test_add.c passed..."));
    }
    Ok(())
}
