// SPDX-License-Identifier: GPL-3.0-or-later

use crate::supervise::{Captured, SuperviseError};
use std::fmt;
use std::time::Duration;

/// How a test executable finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed,
    Failed,
    TimedOut(Duration),
}

/// The outcome of running one test executable.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub verdict: Verdict,
    pub stdout: String,
    pub stderr: String,
    /// What the compiler and the linker printed while building the test.
    pub warnings: String,
}

impl TestResult {
    /// Classifies the execution of a test executable.
    ///
    /// Exit code zero passes, anything else fails. Running out of time is a
    /// verdict on its own. Every other execution problem is handed back to the
    /// caller, since that's not something the test did.
    pub fn classify(name: &str, execution: Result<Captured, SuperviseError>) -> Result<Self, SuperviseError> {
        match execution {
            Ok(captured) => {
                let verdict = if captured.success() { Verdict::Passed } else { Verdict::Failed };
                Ok(Self {
                    name: name.to_string(),
                    verdict,
                    stdout: captured.stdout,
                    stderr: captured.stderr,
                    warnings: String::new(),
                })
            }
            Err(SuperviseError::Timeout { limit, stdout, stderr, .. }) => {
                let verdict = Verdict::TimedOut(limit);
                Ok(Self { name: name.to_string(), verdict, stdout, stderr, warnings: String::new() })
            }
            Err(error) => Err(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }

    /// Attaches the output of the build steps which succeeded.
    pub fn with_warnings<'a>(mut self, outputs: impl IntoIterator<Item = &'a Captured>) -> Self {
        self.warnings = outputs
            .into_iter()
            .flat_map(|output| [output.stdout.as_str(), output.stderr.as_str()])
            .collect();
        self
    }
}

/// Counters of a test run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStatistics {
    pub discovered: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Tests which could not be compiled or linked.
    pub errored: usize,
}

impl RunStatistics {
    pub fn record(&mut self, result: &TestResult) {
        match result.verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::TimedOut(_) => self.timed_out += 1,
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test run:")?;
        writeln!(f, "  discovered: {}", self.discovered)?;
        writeln!(f, "  passed: {}", self.passed)?;
        writeln!(f, "  failed: {}", self.failed)?;
        writeln!(f, "  timed out: {}", self.timed_out)?;
        write!(f, "  compilation/linking errors: {}", self.errored)
    }
}
