// SPDX-License-Identifier: GPL-3.0-or-later

//! Compiles, links and runs the tests of the project.
//!
//! Each source file in the test directory is a standalone test program with
//! its own `main` function. The executor compiles it, links it with the
//! objects of the project build, runs the executable and reports the result.
//! A test passes when its executable exits with zero.
//!
//! The tests run one after the other, in the order of their file names.

mod case;
mod result;
mod toolchain;

pub use case::{Layout, TestCase};
pub use result::{RunStatistics, TestResult, Verdict};
pub use toolchain::{CompilerToolchain, Toolchain, ToolchainError};

#[cfg(test)]
pub use toolchain::MockToolchain;

use crate::project::BuildArtifactSet;
use crate::report::Reporter;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// The aggregated outcome of all tests in a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub all_passed: bool,
    pub statistics: RunStatistics,
}

impl RunOutcome {
    pub fn exit_code(&self) -> ExitCode {
        if self.all_passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
    }
}

impl Layout {
    /// Creates the object and binary directories, if those are missing.
    pub fn prepare(&self) -> Result<(), SuiteError> {
        for directory in [self.object_directory(), self.binary_directory()] {
            fs::create_dir_all(&directory).map_err(|source| SuiteError::Directory { path: directory, source })?;
        }
        Ok(())
    }

    /// Lists the test sources, sorted by file name.
    pub fn discover(&self) -> Result<Vec<TestCase>, SuiteError> {
        let discovery_error = |source| SuiteError::Discovery { path: self.directory.clone(), source };

        let mut cases = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(discovery_error)? {
            let entry = entry.map_err(discovery_error)?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            match file_name.to_str().and_then(|name| self.test_case(name)) {
                Some(case) => cases.push(case),
                None => log::debug!("Skipping non-test file: {}", entry.path().display()),
            }
        }
        cases.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(cases)
    }
}

/// Runs every test of the test directory.
pub struct TestExecutor {
    layout: Layout,
    toolchain: Box<dyn Toolchain>,
}

impl TestExecutor {
    pub fn new(layout: Layout, toolchain: Box<dyn Toolchain>) -> Self {
        Self { layout, toolchain }
    }

    /// Runs all the tests and aggregates their results.
    ///
    /// A test which can't be compiled or linked is reported and counts as not
    /// passed, then the run continues with the next one. The run stops early
    /// only when the tool itself gets interrupted.
    pub fn run<W: io::Write>(
        &self,
        artifacts: &BuildArtifactSet,
        reporter: &mut Reporter<W>,
    ) -> Result<RunOutcome, SuiteError> {
        self.layout.prepare()?;
        let cases = self.layout.discover()?;

        let mut statistics = RunStatistics { discovered: cases.len(), ..RunStatistics::default() };
        if cases.is_empty() {
            reporter.no_tests(&self.layout.directory)?;
            return Ok(RunOutcome { all_passed: true, statistics });
        }
        log::info!("Discovered {} test files in {}", cases.len(), self.layout.directory.display());

        let mut all_passed = true;
        for case in &cases {
            match self.execute(case, artifacts) {
                Ok(result) => {
                    log::debug!("Test {} finished: {:?}", case.name, result.verdict);
                    statistics.record(&result);
                    reporter.result(&result)?;
                    all_passed = all_passed && result.passed();
                }
                Err(error) if error.is_interrupted() => {
                    return Err(SuiteError::Interrupted(error));
                }
                Err(error) => {
                    log::debug!("Test {} could not be built: {error}", case.name);
                    statistics.errored += 1;
                    reporter.toolchain_error(&error)?;
                    all_passed = false;
                }
            }
        }

        Ok(RunOutcome { all_passed, statistics })
    }

    /// Compiles, links and runs a single test.
    pub fn execute(&self, case: &TestCase, artifacts: &BuildArtifactSet) -> Result<TestResult, ToolchainError> {
        let compiled = self.toolchain.compile(&case.source, &case.object)?;
        let linked = self.toolchain.link(&case.object, artifacts, &case.executable)?;
        let execution = self.toolchain.execute(&case.executable);
        Ok(TestResult::classify(&case.name, execution)?.with_warnings([&compiled, &linked]))
    }
}

/// Errors which stop the whole test run.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Failed to create directory '{path}': {source}", path = path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to list test sources in '{path}': {source}", path = path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Test run interrupted: {0}")]
    Interrupted(#[source] ToolchainError),
    #[error("Failed to write the report: {0}")]
    Output(#[from] io::Error),
}
