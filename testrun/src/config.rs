// SPDX-License-Identifier: GPL-3.0-or-later

//! This module defines the configuration of the application.
//!
//! The configuration is either loaded from a file or used with default
//! values, which are defined in the code. The defaults describe the usual
//! project layout: `make` builds the objects into `./build`, the public
//! headers are in `./include` and the test sources are in `./tests`.
//!
//! The configuration file syntax is based on the YAML format.
//! The default configuration file name is `testrun.yml`.
//!
//! The configuration file location is searched in the following order:
//! 1. The current working directory
//! 2. The local configuration directory of the user
//! 3. The configuration directory of the user
//! 4. The local configuration directory of the application
//! 5. The configuration directory of the application
//!
//! ```yaml
//! schema: 1.0
//!
//! build:
//!   command: make -j4
//!   directory: ./build
//!   entry_point: main.o
//!   timeout: 600
//!
//! compiler:
//!   path: /usr/bin/clang
//!   include: ./include
//!   flags: ["-g", "-Wall"]
//!   link_flags: ["-lm"]
//!   timeout: 60
//!
//! tests:
//!   directory: ./tests
//!   extension: c
//!   timeout: 10
//! ```

// Re-Export the types and the loader module content.
pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::{ValidationError, Validator};

mod types {
    use serde::Deserialize;
    use std::fmt;
    use std::path::PathBuf;
    use std::time::Duration;

    /// Represents the application configuration.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default)]
        pub build: Build,
        #[serde(default)]
        pub compiler: Compiler,
        #[serde(default)]
        pub tests: Tests,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                build: Build::default(),
                compiler: Compiler::default(),
                tests: Tests::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "Configuration:")?;
            match serde_yml::to_string(self) {
                Ok(yaml_string) => {
                    for line in yaml_string.lines() {
                        writeln!(f, "{}", line)?;
                    }
                    Ok(())
                }
                Err(_) => Err(fmt::Error),
            }
        }
    }

    /// How the project itself gets built, and where its objects end up.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Build {
        /// The build command, split into words the way a shell would do.
        #[serde(default = "default_build_command")]
        pub command: String,
        /// The directory where the build command puts the object files.
        #[serde(default = "default_build_directory")]
        pub directory: PathBuf,
        /// The object file which holds the project's `main` function.
        #[serde(default = "default_entry_point")]
        pub entry_point: String,
        /// Seconds the build command may run.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub timeout: Option<u64>,
    }

    impl Default for Build {
        fn default() -> Self {
            Self {
                command: default_build_command(),
                directory: default_build_directory(),
                entry_point: default_entry_point(),
                timeout: None,
            }
        }
    }

    impl Build {
        pub fn time_limit(&self) -> Option<Duration> {
            self.timeout.map(Duration::from_secs)
        }
    }

    /// The compiler used to compile and link the test sources.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Compiler {
        /// When missing, the `CC` environment variable is used, then `gcc`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub path: Option<PathBuf>,
        #[serde(default = "default_include_directory")]
        pub include: PathBuf,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub flags: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub link_flags: Vec<String>,
        /// Seconds a single compile or link step may run.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub timeout: Option<u64>,
    }

    impl Default for Compiler {
        fn default() -> Self {
            Self {
                path: None,
                include: default_include_directory(),
                flags: vec![],
                link_flags: vec![],
                timeout: None,
            }
        }
    }

    impl Compiler {
        pub fn time_limit(&self) -> Option<Duration> {
            self.timeout.map(Duration::from_secs)
        }
    }

    /// Where the test sources are, and how the derived files are named.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Tests {
        #[serde(default = "default_tests_directory")]
        pub directory: PathBuf,
        /// Source file extension, without the leading dot.
        #[serde(default = "default_source_extension")]
        pub extension: String,
        /// Seconds a single test executable may run.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub timeout: Option<u64>,
    }

    impl Default for Tests {
        fn default() -> Self {
            Self {
                directory: default_tests_directory(),
                extension: default_source_extension(),
                timeout: None,
            }
        }
    }

    impl Tests {
        pub fn time_limit(&self) -> Option<Duration> {
            self.timeout.map(Duration::from_secs)
        }
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";
    pub const DEFAULT_C_COMPILER: &str = "gcc";
    pub const OBJECT_EXTENSION: &str = "o";
    pub const EXECUTABLE_EXTENSION: &str = "out";

    fn default_build_command() -> String {
        String::from("make")
    }

    fn default_build_directory() -> PathBuf {
        PathBuf::from("./build")
    }

    fn default_entry_point() -> String {
        String::from("main.o")
    }

    fn default_include_directory() -> PathBuf {
        PathBuf::from("./include")
    }

    fn default_tests_directory() -> PathBuf {
        PathBuf::from("./tests")
    }

    fn default_source_extension() -> String {
        String::from("c")
    }

    // Custom deserialization function to validate the schema version
    fn validate_schema_version<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let schema: String = Deserialize::deserialize(deserializer)?;
        if schema != SUPPORTED_SCHEMA_VERSION {
            use serde::de::Error;
            Err(Error::custom(format!(
                "Unsupported schema version: {schema}. Expected: {SUPPORTED_SCHEMA_VERSION}"
            )))
        } else {
            Ok(schema)
        }
    }
}

pub mod validation {

    use super::types::*;
    use thiserror::Error;

    /// Trait for validating configuration objects
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    /// Validation errors for configuration
    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("Empty value for field '{field}'")]
        EmptyValue { field: &'static str },
        #[error("Build command can't be split into words: {message}")]
        CommandSyntax { message: String },
        #[error("Source extension '{extension}' collides with a derived file extension")]
        ExtensionCollision { extension: String },
        #[error("Zero timeout for field '{field}'")]
        ZeroTimeout { field: &'static str },
        #[error("Multiple validation errors: {errors:?}")]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Combinator for collecting and handling validation errors
    #[derive(Default)]
    struct ValidationCollector {
        errors: Vec<ValidationError>,
    }

    impl ValidationCollector {
        fn new() -> Self {
            Self { errors: Vec::new() }
        }

        fn add(&mut self, error: ValidationError) {
            self.errors.push(error);
        }

        fn add_result(&mut self, result: Result<(), ValidationError>) {
            if let Err(error) = result {
                match error {
                    ValidationError::Multiple { errors } => {
                        self.errors.extend(errors);
                    }
                    single_error => self.errors.push(single_error),
                }
            }
        }

        fn require(&mut self, field: &'static str, empty: bool) {
            if empty {
                self.add(ValidationError::EmptyValue { field });
            }
        }

        fn require_timeout(&mut self, field: &'static str, timeout: Option<u64>) {
            if timeout == Some(0) {
                self.add(ValidationError::ZeroTimeout { field });
            }
        }

        fn finish(self) -> Result<(), ValidationError> {
            let mut errors = self.errors;
            match errors.len() {
                0 => Ok(()),
                1 => Err(errors.remove(0)),
                _ => Err(ValidationError::Multiple { errors }),
            }
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            collector.add_result(Build::validate(&config.build));
            collector.add_result(Compiler::validate(&config.compiler));
            collector.add_result(Tests::validate(&config.tests));

            collector.finish()
        }
    }

    impl Validator<Build> for Build {
        type Error = ValidationError;

        fn validate(config: &Build) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            match shell_words::split(&config.command) {
                Ok(words) => collector.require("build.command", words.is_empty()),
                Err(error) => {
                    collector.add(ValidationError::CommandSyntax { message: error.to_string() })
                }
            }
            collector.require("build.directory", config.directory.as_os_str().is_empty());
            collector.require("build.entry_point", config.entry_point.trim().is_empty());
            collector.require_timeout("build.timeout", config.timeout);

            collector.finish()
        }
    }

    impl Validator<Compiler> for Compiler {
        type Error = ValidationError;

        fn validate(config: &Compiler) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            if let Some(path) = &config.path {
                collector.require("compiler.path", path.as_os_str().is_empty());
            }
            collector.require("compiler.include", config.include.as_os_str().is_empty());
            collector.require_timeout("compiler.timeout", config.timeout);

            collector.finish()
        }
    }

    impl Validator<Tests> for Tests {
        type Error = ValidationError;

        fn validate(config: &Tests) -> Result<(), Self::Error> {
            let mut collector = ValidationCollector::new();

            collector.require("tests.directory", config.directory.as_os_str().is_empty());
            let extension = config.extension.trim_start_matches('.');
            collector.require("tests.extension", extension.is_empty());
            if extension == OBJECT_EXTENSION || extension == EXECUTABLE_EXTENSION {
                collector.add(ValidationError::ExtensionCollision { extension: extension.to_string() });
            }
            collector.require_timeout("tests.timeout", config.timeout);

            collector.finish()
        }
    }

}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs::OpenOptions;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    const CONFIG_FILE_NAME: &str = "testrun.yml";

    pub struct Loader {}

    impl Loader {
        /// Loads the configuration from the default locations.
        ///
        /// The first configuration file found is used. If the configuration file is
        /// not found, the default configuration will be returned.
        pub fn load(context: &crate::context::Context) -> Result<Main, ConfigError> {
            let locations = Self::file_locations(context);
            for location in locations {
                debug!("Checking configuration file: {}", location.display());
                if location.exists() {
                    return Self::from_file(location.as_path());
                }
            }
            // If the configuration file is not found, return the default configuration.
            debug!("Configuration file not found. Using the default configuration.");
            Ok(Main::default())
        }

        /// The default locations where the configuration file can be found.
        ///
        /// The locations are searched in the following order:
        /// - The current working directory.
        /// - The local configuration directory of the user.
        /// - The configuration directory of the user.
        /// - The local configuration directory of the application.
        /// - The configuration directory of the application.
        fn file_locations(context: &crate::context::Context) -> Vec<PathBuf> {
            let mut locations = Vec::new();

            locations.push(context.current_directory.clone());
            if let Some(base_dirs) = BaseDirs::new() {
                locations.push(base_dirs.config_local_dir().to_path_buf());
                locations.push(base_dirs.config_dir().to_path_buf());
            }

            if let Some(proj_dirs) = ProjectDirs::from("", "", "testrun") {
                locations.push(proj_dirs.config_local_dir().to_path_buf());
                locations.push(proj_dirs.config_dir().to_path_buf());
            }
            // filter out duplicate elements from the list
            locations.dedup();
            // append the default configuration file name to the locations
            locations.iter().map(|p| p.join(CONFIG_FILE_NAME)).collect()
        }

        /// Loads the configuration from the specified file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Loading configuration file: {}", path.display());

            let reader = OpenOptions::new()
                .read(true)
                .open(path)
                .map_err(|source| ConfigError::FileAccess { path: path.to_path_buf(), source })?;

            let content: Main = Self::from_reader(reader)
                .map_err(|source| ConfigError::ParseError { path: path.to_path_buf(), source })?;

            Main::validate(&content)
                .map_err(|source| ConfigError::ValidationError { path: path.to_path_buf(), source })?;

            Ok(content)
        }

        /// Define the deserialization format of the config file.
        fn from_reader<R, T>(rdr: R) -> serde_yml::Result<T>
        where
            R: std::io::Read,
            T: serde::de::DeserializeOwned,
        {
            serde_yml::from_reader(rdr)
        }
    }

    /// Represents all possible configuration-related errors.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Error when opening or reading a configuration file.
        #[error("Failed to access configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        /// Error when parsing the configuration file format.
        #[error("Failed to parse configuration from file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        /// Error when configuration validation fails.
        #[error("Configuration validation failed for file '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

}
