// SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::{self, DEFAULT_C_COMPILER};
use crate::context::Context;
use crate::environment::KEY_MAKE__C_COMPILER;
use crate::project::BuildArtifactSet;
use crate::supervise::{Captured, SuperviseError, Supervisor, command_line};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;

/// A trait for turning a test source into a running test.
///
/// The three steps are separate, so the executor can tell a broken toolchain
/// (compile or link failed) apart from a failing test (the executable ran and
/// returned non-zero).
#[cfg_attr(test, mockall::automock)]
pub trait Toolchain {
    /// Compiles the source file into an object file.
    ///
    /// Returns the output of the compiler, which may carry warnings.
    fn compile(&self, source: &Path, object: &Path) -> Result<Captured, ToolchainError>;

    /// Links the test object with the project objects into an executable.
    fn link(&self, object: &Path, artifacts: &BuildArtifactSet, executable: &Path) -> Result<Captured, ToolchainError>;

    /// Runs the test executable. A non-zero exit status is not an error.
    fn execute(&self, executable: &Path) -> Result<Captured, SuperviseError>;
}

/// Compiles and links with a C compiler driver (gcc, clang, cc).
pub struct CompilerToolchain {
    compiler: PathBuf,
    include: PathBuf,
    flags: Vec<String>,
    link_flags: Vec<String>,
    working_dir: PathBuf,
    step_timeout: Option<Duration>,
    test_timeout: Option<Duration>,
    supervisor: Supervisor,
}

impl CompilerToolchain {
    /// Creates the toolchain from the configuration.
    ///
    /// The compiler is taken from the configuration, then from the `CC`
    /// environment variable, and falls back to `gcc`.
    pub fn configure(
        context: &Context,
        compiler: &config::Compiler,
        tests: &config::Tests,
        supervisor: Supervisor,
    ) -> Self {
        let executable = compiler
            .path
            .clone()
            .or_else(|| context.variable(KEY_MAKE__C_COMPILER).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_C_COMPILER));
        log::debug!("Using compiler: {}", executable.display());

        Self {
            compiler: executable,
            include: context.resolve(&compiler.include),
            flags: compiler.flags.clone(),
            link_flags: compiler.link_flags.clone(),
            working_dir: context.current_directory.clone(),
            step_timeout: compiler.time_limit(),
            test_timeout: tests.time_limit(),
            supervisor,
        }
    }

    fn compile_command(&self, source: &Path, object: &Path) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .arg("-c")
            .arg(source)
            .arg("-I")
            .arg(&self.include)
            .args(&self.flags)
            .arg("-o")
            .arg(object)
            .current_dir(&self.working_dir);
        command
    }

    fn link_command(&self, object: &Path, artifacts: &BuildArtifactSet, executable: &Path) -> Command {
        let mut command = Command::new(&self.compiler);
        command
            .arg(object)
            .args(artifacts.objects())
            .args(&self.link_flags)
            .arg("-o")
            .arg(executable)
            .current_dir(&self.working_dir);
        command
    }
}

impl Toolchain for CompilerToolchain {
    fn compile(&self, source: &Path, object: &Path) -> Result<Captured, ToolchainError> {
        let mut command = self.compile_command(source, object);
        let output = self.supervisor.run(&mut command, self.step_timeout)?;
        if output.success() {
            Ok(output)
        } else {
            Err(ToolchainError::Compile { file: source.to_path_buf(), command: command_line(&command), output })
        }
    }

    fn link(&self, object: &Path, artifacts: &BuildArtifactSet, executable: &Path) -> Result<Captured, ToolchainError> {
        let mut command = self.link_command(object, artifacts, executable);
        let output = self.supervisor.run(&mut command, self.step_timeout)?;
        if output.success() {
            Ok(output)
        } else {
            Err(ToolchainError::Link { file: executable.to_path_buf(), command: command_line(&command), output })
        }
    }

    fn execute(&self, executable: &Path) -> Result<Captured, SuperviseError> {
        let mut command = Command::new(executable);
        command.current_dir(&self.working_dir);
        self.supervisor.run(&mut command, self.test_timeout)
    }
}

/// Errors that prevent a test from running at all.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("Command '{command}' returned {}", .output.status)]
    Compile { file: PathBuf, command: String, output: Captured },
    #[error("Command '{command}' returned {}", .output.status)]
    Link { file: PathBuf, command: String, output: Captured },
    #[error(transparent)]
    Execution(#[from] SuperviseError),
}

impl ToolchainError {
    /// The text the failing tool printed, if there is any.
    pub fn diagnostics(&self) -> Vec<&str> {
        let (stdout, stderr) = match self {
            ToolchainError::Compile { output, .. } | ToolchainError::Link { output, .. } => {
                (output.stdout.as_str(), output.stderr.as_str())
            }
            ToolchainError::Execution(SuperviseError::Timeout { stdout, stderr, .. }) => {
                (stdout.as_str(), stderr.as_str())
            }
            ToolchainError::Execution(_) => return vec![],
        };
        [stdout, stderr].into_iter().filter(|text| !text.is_empty()).collect()
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, ToolchainError::Execution(error) if error.is_interrupted())
    }
}
