// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::infrastructure::TestProject;
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn unsupported_schema_is_rejected() -> Result<()> {
    let project = TestProject::empty()?;
    project.write_config("schema: 0.9\n")?;

    project
        .command()?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported schema version"));
    Ok(())
}

#[test]
fn invalid_values_are_rejected_before_the_build() -> Result<()> {
    // The build command would fail, but the configuration is checked first.
    let project = TestProject::empty()?;
    project.write_config("schema: 1.0\nbuild:\n  command: \"make 'all\"\ntests:\n  timeout: 0\n")?;

    project
        .command()?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration validation failed"));
    assert!(!project.exists("build"));
    Ok(())
}

#[test]
#[cfg(has_executable_true)]
fn custom_test_directory() -> Result<()> {
    let project = TestProject::empty()?;
    project.write_config(&format!(
        "schema: 1.0\nbuild:\n  command: {}\ntests:\n  directory: ./unit\n",
        crate::fixtures::constants::TRUE_PATH
    ))?;

    project
        .command()?
        .assert()
        .success()
        .stdout(predicate::str::contains("No tests found in"))
        .stdout(predicate::str::contains("unit"));
    assert!(project.exists("unit/bin"));
    assert!(!project.exists("tests"));
    Ok(())
}
