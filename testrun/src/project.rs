// SPDX-License-Identifier: GPL-3.0-or-later

//! Builds the project under test.
//!
//! The project is built by an external build command (`make` by default),
//! which is expected to leave its object files in the build directory. The
//! object files, except the one holding the project's entry point, are what
//! every test executable gets linked against.

use crate::config::OBJECT_EXTENSION;
use crate::supervise::{Captured, SuperviseError, Supervisor, command_line};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use thiserror::Error;

/// The build command split into words.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildCommand {
    pub program: String,
    pub arguments: Vec<String>,
}

impl TryFrom<&str> for BuildCommand {
    type Error = CommandError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut words = shell_words::split(value)?.into_iter();
        let program = words.next().ok_or(CommandError::Empty)?;
        Ok(BuildCommand { program, arguments: words.collect() })
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(&self.program).chain(&self.arguments);
        write!(f, "{}", shell_words::join(words))
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Build command can't be split into words: {0}")]
    Syntax(#[from] shell_words::ParseError),
    #[error("Build command is empty")]
    Empty,
}

/// The object files produced by the project build.
///
/// Never contains the entry point object, since linking it together with a
/// test (which has its own `main`) would define `main` twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildArtifactSet {
    objects: Vec<PathBuf>,
}

impl BuildArtifactSet {
    /// Collects the object files from the build directory.
    ///
    /// Only regular files with the object extension are taken. The result is
    /// sorted, so the link command line is the same from run to run.
    pub fn collect(directory: &Path, entry_point: &str) -> io::Result<Self> {
        let mut objects = Vec::new();
        for entry in fs::read_dir(directory)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_name() == entry_point {
                log::debug!("Excluding entry point object: {}", path.display());
                continue;
            }
            let is_object = path.extension().is_some_and(|extension| extension == OBJECT_EXTENSION);
            if is_object && path.is_file() {
                objects.push(path);
            }
        }
        objects.sort();
        Ok(Self { objects })
    }

    pub fn objects(&self) -> &[PathBuf] {
        &self.objects
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl FromIterator<PathBuf> for BuildArtifactSet {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self { objects: iter.into_iter().collect() }
    }
}

impl fmt::Display for BuildArtifactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build artifacts: {} objects", self.objects.len())?;
        for object in &self.objects {
            writeln!(f, "  {}", object.display())?;
        }
        Ok(())
    }
}

/// The result of a successful project build.
#[derive(Debug)]
pub struct BuildProduct {
    pub output: Captured,
    pub artifacts: BuildArtifactSet,
}

/// A trait for building the project under test.
///
/// The build runs once per session, and its success is a precondition for
/// every test.
#[cfg_attr(test, mockall::automock)]
pub trait Builder {
    /// Runs the build to completion.
    ///
    /// # Returns
    /// * `Ok(BuildProduct)` - The build succeeded, with its output and objects
    /// * `Err(BuildError)` - The build failed or could not be started
    fn build(&self) -> Result<BuildProduct, BuildError>;
}

/// Builds the project by running the configured build command.
pub struct ProjectBuilder {
    command: BuildCommand,
    directory: PathBuf,
    entry_point: String,
    working_dir: PathBuf,
    timeout: Option<Duration>,
    supervisor: Supervisor,
}

impl ProjectBuilder {
    pub fn new(
        command: BuildCommand,
        directory: PathBuf,
        entry_point: String,
        working_dir: PathBuf,
        timeout: Option<Duration>,
        supervisor: Supervisor,
    ) -> Self {
        Self { command, directory, entry_point, working_dir, timeout, supervisor }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.command.program);
        command.args(&self.command.arguments);
        command.current_dir(&self.working_dir);
        command
    }
}

impl Builder for ProjectBuilder {
    fn build(&self) -> Result<BuildProduct, BuildError> {
        fs::create_dir_all(&self.directory)
            .map_err(|source| BuildError::Directory { path: self.directory.clone(), source })?;

        let mut command = self.command();
        log::info!("Building the project: {}", command_line(&command));
        let output = self.supervisor.run(&mut command, self.timeout)?;
        log::debug!("Build finished with status: {:?}", output.status);
        if !output.success() {
            return Err(BuildError::Failed(output));
        }

        let artifacts = BuildArtifactSet::collect(&self.directory, &self.entry_point)
            .map_err(|source| BuildError::Artifacts { path: self.directory.clone(), source })?;
        log::info!("{artifacts}");
        if artifacts.is_empty() {
            log::warn!("No object files found in {}", self.directory.display());
        }

        Ok(BuildProduct { output, artifacts })
    }
}

/// Errors that can occur while building the project.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to create build directory '{path}': {source}", path = path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to run the build command: {0}")]
    Execution(#[from] SuperviseError),
    #[error("Project build failed with {}", .0.status)]
    Failed(Captured),
    #[error("Failed to list build artifacts in '{path}': {source}", path = path.display())]
    Artifacts {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
