// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The only switch controls whether the pass/fail status lines are decorated
//! with ANSI color codes. Everything else comes from the configuration file.

use clap::{ArgAction, ArgMatches, Command, arg, command};
use std::fmt;

const NO_FORMAT_FLAG: &str = "no-format";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // Whether status lines are colored.
    pub formatted: bool,
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let no_format = matches.get_flag(NO_FORMAT_FLAG);
        Ok(Arguments { formatted: !no_format })
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arguments: formatted={}", self.formatted)
    }
}

/// Represents the command line interface of the application.
///
/// The tool is invoked from the root of the C project and takes no
/// positional arguments.
pub fn cli() -> Command {
    command!().args(&[arg!(--"no-format" "Disable ANSI colors in the test status lines")
        .action(ArgAction::SetTrue)])
}
