// SPDX-License-Identifier: GPL-3.0-or-later

//! Console output of the test run.
//!
//! This is what the user reads, so it goes to the given writer regardless of
//! the log level. The status lines are optionally decorated with ANSI colors.

use crate::suite::{TestResult, ToolchainError, Verdict};
use crate::supervise::Captured;
use std::io::{self, Write};
use std::path::Path;

const BOLD_RED: &str = "\x1b[1m\x1b[91m";
const BOLD_GREEN: &str = "\x1b[1m\x1b[92m";
const RESET: &str = "\x1b[0m";

/// The color codes used in the status lines.
///
/// Without formatting every code is an empty string, so the same format
/// strings produce plain text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub red: &'static str,
    pub green: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn new(formatted: bool) -> Self {
        if formatted { Self { red: BOLD_RED, green: BOLD_GREEN, reset: RESET } } else { Self::plain() }
    }

    pub fn plain() -> Self {
        Self { red: "", green: "", reset: "" }
    }
}

/// Writes the build output and the test status lines.
pub struct Reporter<W: Write> {
    out: W,
    palette: Palette,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        Self { out, palette }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// The output of a successful project build.
    pub fn build_output(&mut self, output: &Captured) -> io::Result<()> {
        self.block(&output.stdout)?;
        self.out.flush()
    }

    /// The output of a failed project build, errors included.
    pub fn build_failure(&mut self, output: &Captured) -> io::Result<()> {
        self.block(&output.stdout)?;
        self.block(&output.stderr)?;
        self.out.flush()
    }

    pub fn no_tests(&mut self, directory: &Path) -> io::Result<()> {
        writeln!(self.out, "No tests found in {}.", directory.display())?;
        self.out.flush()
    }

    /// The status line of a test, with the test's own output when it did not pass.
    ///
    /// Warnings of the compiler or the linker come before the status line.
    pub fn result(&mut self, result: &TestResult) -> io::Result<()> {
        self.block(&result.warnings)?;
        let Palette { red, green, reset } = self.palette;
        match &result.verdict {
            Verdict::Passed => writeln!(self.out, "{green}[PASS]{reset} {} passed...", result.name)?,
            Verdict::Failed => writeln!(self.out, "{red}[FAIL]{reset} {} failed...", result.name)?,
            Verdict::TimedOut(limit) => {
                writeln!(self.out, "{red}[TIME]{reset} {} timed out after {limit:?}...", result.name)?
            }
        }
        if !result.passed() {
            self.block(&result.stdout)?;
            self.block(&result.stderr)?;
        }
        self.out.flush()
    }

    /// A test which could not be compiled or linked.
    pub fn toolchain_error(&mut self, error: &ToolchainError) -> io::Result<()> {
        writeln!(self.out, "An error occurred during compilation/linking: {error}")?;
        for text in error.diagnostics() {
            self.block(text)?;
        }
        self.out.flush()
    }

    // Captured output is printed as is, but always ends with a new line.
    fn block(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }
}
