// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment variables which influence the project build and the tests.
//!
//! The runner reads only `CC` itself. The others are passed through to the
//! build command and the compiler untouched, and are logged to help explain
//! a build which behaves differently than expected.

pub const KEY_OS__PATH: &str = "PATH";

// https://www.gnu.org/software/make/manual/html_node/Implicit-Variables.html
pub const KEY_MAKE__C_COMPILER: &str = "CC";
pub const KEY_MAKE__C_PREPROCESSOR: &str = "CPP";
pub const KEY_MAKE__MAKE: &str = "MAKE";
pub const KEY_MAKE__C_FLAGS: &str = "CFLAGS";
pub const KEY_MAKE__C_PREPROCESSOR_FLAGS: &str = "CPPFLAGS";
pub const KEY_MAKE__LINKER_FLAGS: &str = "LDFLAGS";
pub const KEY_MAKE__LINKER_LIBS: &str = "LDLIBS";
pub const KEY_MAKE__MAKE_FLAGS: &str = "MAKEFLAGS";

// https://gcc.gnu.org/onlinedocs/gcc/Environment-Variables.html
pub const KEY_GCC__INCLUDE: &str = "CPATH";
pub const KEY_GCC__C_INCLUDE: &str = "C_INCLUDE_PATH";
pub const KEY_GCC__LIBRARY_PATH: &str = "LIBRARY_PATH";

const BUILD_KEYS: [&str; 11] = [
    KEY_MAKE__C_COMPILER,
    KEY_MAKE__C_PREPROCESSOR,
    KEY_MAKE__MAKE,
    KEY_MAKE__C_FLAGS,
    KEY_MAKE__C_PREPROCESSOR_FLAGS,
    KEY_MAKE__LINKER_FLAGS,
    KEY_MAKE__LINKER_LIBS,
    KEY_MAKE__MAKE_FLAGS,
    KEY_GCC__INCLUDE,
    KEY_GCC__C_INCLUDE,
    KEY_GCC__LIBRARY_PATH,
];

/// Variables which influence how the project and the tests get built.
pub fn relevant_env(key: &str) -> bool {
    // Windows keeps the search path in `Path`.
    BUILD_KEYS.contains(&key) || key.eq_ignore_ascii_case(KEY_OS__PATH)
}
