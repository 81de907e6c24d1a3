// SPDX-License-Identifier: GPL-3.0-or-later

use crate::project::{BuildCommand, BuildError, Builder, CommandError, ProjectBuilder};
use crate::report::{Palette, Reporter};
use crate::suite::{CompilerToolchain, Layout, SuiteError, TestExecutor};
use crate::supervise::{SuperviseError, Supervisor};
use crate::{args, config, context};
use std::io;
use std::process::ExitCode;
use thiserror::Error;

/// One invocation of the tool: build the project, then run every test.
///
/// The build is a precondition. When it fails, no test is compiled and the
/// session fails with the output of the build.
pub struct Session {
    builder: Box<dyn Builder>,
    executor: TestExecutor,
    palette: Palette,
}

impl Session {
    /// Configure the session from the command line arguments and the configuration.
    ///
    /// Relative paths of the configuration are resolved against the current
    /// working directory. Problems found here are reported before anything
    /// is executed.
    pub fn configure(
        context: &context::Context,
        arguments: args::Arguments,
        config: config::Main,
    ) -> Result<Self, ConfigurationError> {
        let command = BuildCommand::try_from(config.build.command.as_str())?;
        log::debug!("Build command: {command}");

        let supervisor = Supervisor::new().map_err(ConfigurationError::Signals)?;
        let builder = ProjectBuilder::new(
            command,
            context.resolve(&config.build.directory),
            config.build.entry_point.clone(),
            context.current_directory.clone(),
            config.build.time_limit(),
            supervisor.clone(),
        );

        let layout = Layout::new(context.resolve(&config.tests.directory), &config.tests.extension);
        let toolchain = CompilerToolchain::configure(context, &config.compiler, &config.tests, supervisor);
        let executor = TestExecutor::new(layout, Box::new(toolchain));

        Ok(Self::new(Box::new(builder), executor, Palette::new(arguments.formatted)))
    }

    pub fn new(builder: Box<dyn Builder>, executor: TestExecutor, palette: Palette) -> Self {
        Self { builder, executor, palette }
    }

    /// Runs the session and writes the report to the given output.
    ///
    /// Returns success only when the build succeeded and every test passed.
    pub fn run<W: io::Write>(self, out: W) -> ExitCode {
        let mut reporter = Reporter::new(out, self.palette);
        self.execute(&mut reporter).unwrap_or_else(|error| {
            log::error!("testrun: {error}");
            ExitCode::FAILURE
        })
    }

    fn execute<W: io::Write>(&self, reporter: &mut Reporter<W>) -> Result<ExitCode, RuntimeError> {
        let product = match self.builder.build() {
            Ok(product) => product,
            Err(BuildError::Failed(output)) => {
                reporter.build_failure(&output)?;
                log::error!("testrun: Project build failed with {}", output.status);
                return Ok(ExitCode::FAILURE);
            }
            Err(error) => return Err(RuntimeError::Build(error)),
        };
        reporter.build_output(&product.output)?;

        let outcome = self.executor.run(&product.artifacts, reporter)?;
        log::info!("{}", outcome.statistics);

        Ok(outcome.exit_code())
    }
}

/// Errors found while setting up the session.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to set up signal handling: {0}")]
    Signals(#[source] SuperviseError),
    #[error("Invalid build command: {0}")]
    BuildCommand(#[from] CommandError),
}

/// Errors which stop a configured session.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Build(#[from] BuildError),
    #[error("{0}")]
    Suite(#[from] SuiteError),
    #[error("Failed to write the report: {0}")]
    Output(#[from] io::Error),
}
