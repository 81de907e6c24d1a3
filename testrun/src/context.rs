// SPDX-License-Identifier: GPL-3.0-or-later

use crate::environment;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Application context containing runtime environment information.
///
/// This struct captures the environmental context needed at startup: where
/// the tool was invoked (which is the root of the C project) and what the
/// environment variables were. Everything after this point works from the
/// captured values, so the later phases don't need to touch the process
/// global state.
#[derive(Debug, Clone)]
pub struct Context {
    /// Current working directory when the tool was invoked
    pub current_directory: PathBuf,
    /// All environment variables at startup
    pub environment: HashMap<String, String>,
}

impl Context {
    /// Capture the current application context.
    ///
    /// This function performs I/O operations to gather system state and should
    /// be called early in the application lifecycle, before any validation phase.
    pub fn capture() -> Result<Self> {
        let current_directory =
            env::current_dir().with_context(|| "Failed to get current working directory")?;

        let environment = environment_from(env::vars_os());

        Ok(Context { current_directory, environment })
    }

    /// Returns the value of an environment variable, if it's set and not empty.
    pub fn variable(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str).filter(|value| !value.is_empty())
    }

    /// Resolve a configured path against the invocation directory.
    ///
    /// Absolute paths are returned as they are. The `.` components are dropped,
    /// so `./tests` becomes `<cwd>/tests` and not `<cwd>/./tests`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() { path.to_path_buf() } else { self.current_directory.join(path) };
        joined.components().filter(|component| !matches!(component, Component::CurDir)).collect()
    }
}

// Variables which are not valid Unicode are kept, with the invalid parts replaced.
fn environment_from(variables: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    variables
        .into_iter()
        .map(|(key, value)| (key.to_string_lossy().into_owned(), value.to_string_lossy().into_owned()))
        .collect()
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Application Context:")?;
        writeln!(f, "Current Directory: {}", self.current_directory.display())?;
        writeln!(f, "Total Environment Variables: {} entries", self.environment.len())?;

        writeln!(f, "Relevant Environment Variables:")?;
        let mut relevant: Vec<_> =
            self.environment.iter().filter(|(key, _)| environment::relevant_env(key)).collect();
        relevant.sort();
        for (key, value) in relevant {
            writeln!(f, "  {}={}", key, value)?;
        }

        Ok(())
    }
}
