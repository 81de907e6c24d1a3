// SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::{EXECUTABLE_EXTENSION, OBJECT_EXTENSION};
use std::path::PathBuf;

const OBJECT_DIRECTORY: &str = "build";
const BINARY_DIRECTORY: &str = "bin";

/// The file system layout of the test directory.
///
/// Test sources live directly in the test directory. Their objects go to the
/// `build` and their executables to the `bin` subdirectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub directory: PathBuf,
    extension: String,
}

impl Layout {
    pub fn new(directory: PathBuf, extension: &str) -> Self {
        Self { directory, extension: extension.trim_start_matches('.').to_string() }
    }

    pub fn object_directory(&self) -> PathBuf {
        self.directory.join(OBJECT_DIRECTORY)
    }

    pub fn binary_directory(&self) -> PathBuf {
        self.directory.join(BINARY_DIRECTORY)
    }

    /// Returns the file name without the source extension, when the file
    /// name has the source extension.
    fn stem<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name
            .strip_suffix(self.extension.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .filter(|stem| !stem.is_empty())
    }

    /// Creates a test case if the file name looks like a test source.
    pub fn test_case(&self, file_name: &str) -> Option<TestCase> {
        let stem = self.stem(file_name)?;
        Some(TestCase {
            name: file_name.to_string(),
            source: self.directory.join(file_name),
            object: self.object_directory().join(format!("{stem}.{OBJECT_EXTENSION}")),
            executable: self.binary_directory().join(format!("{stem}.{EXECUTABLE_EXTENSION}")),
        })
    }
}

/// One test source file with the paths derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// The file name of the source, used in the status lines.
    pub name: String,
    pub source: PathBuf,
    pub object: PathBuf,
    pub executable: PathBuf,
}
