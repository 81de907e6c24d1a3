// SPDX-License-Identifier: GPL-3.0-or-later

//! Build-time utilities for host tool detection
//!
//! This crate provides functions for checking which executables are available
//! on the build host. It's designed to be used in build scripts to generate
//! appropriate cfg flags, so tests that need a real `make` or C compiler are
//! only compiled where those tools exist.

use std::path::{Path, PathBuf};

/// Check if an executable is available on the `PATH`
///
/// # Arguments
/// * `executable` - The executable name (e.g., "true")
///
/// # Output
/// Generates `cargo:rustc-cfg=has_executable_{executable}` and sets the
/// `{EXECUTABLE}_PATH` environment variable for the compiled crate if the
/// executable is found
pub fn check_executable_exists(executable: &str) {
    match which::which(executable) {
        Ok(path) => announce(executable, &path),
        Err(_) => {
            println!("cargo:warning=Checking for executable: {} ... missing", executable);
        }
    }
}

/// Check if any of the candidate executables is available on the `PATH`
///
/// The first candidate found wins. The cfg flag is named after `define`
/// instead of the executable, so `["gcc", "clang", "cc"]` all produce
/// `has_executable_compiler_c`.
pub fn check_one_executable_exists(define: &str, executables: &[&str]) {
    for executable in executables {
        if let Ok(path) = which::which(executable) {
            announce(define, &prefer_real_compiler(executable, path));
            return;
        }
    }
    println!("cargo:warning=Checking for executable: {} ... missing", define);
}

fn announce(define: &str, path: &Path) {
    println!("cargo:rustc-cfg=has_executable_{}", define);
    println!("cargo:rustc-check-cfg=cfg(has_executable_{})", define);
    println!("cargo:rustc-env={}_PATH={}", define.to_uppercase(), path.display());
    println!("cargo:warning=Checking for executable: {} ... {}", define, path.display());
}

// ccache wrappers write into the user's cache, the real compiler is preferred.
fn prefer_real_compiler(executable: &str, path: PathBuf) -> PathBuf {
    if !path.to_string_lossy().contains("ccache") {
        return path;
    }
    let real_path = Path::new("/usr/bin").join(executable);
    if real_path.exists() {
        println!(
            "cargo:warning=Preferring real compiler {} over ccache wrapper {}",
            real_path.display(),
            path.display()
        );
        real_path
    } else {
        path
    }
}

/// Perform all host checks needed by the test runner's own tests
pub fn perform_system_checks() {
    check_executable_exists("true");
    check_executable_exists("false");
    check_one_executable_exists("shell", &["sh", "bash", "zsh"]);
    check_one_executable_exists("make", &["make", "gmake", "mingw32-make"]);
    check_one_executable_exists("compiler_c", &["gcc", "clang", "cc"]);
}

/// Get all the cfg flags that should be added to check-cfg
pub fn get_all_cfg_flags() -> Vec<&'static str> {
    vec![
        "has_executable_true",
        "has_executable_false",
        "has_executable_shell",
        "has_executable_make",
        "has_executable_compiler_c",
    ]
}
