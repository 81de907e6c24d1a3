// SPDX-License-Identifier: GPL-3.0-or-later

//! testrun Build Configuration
//!
//! The runner itself needs nothing from the build host. Its tests do: the
//! end-to-end cases drive a real `make` and C compiler. This script detects
//! those tools and exposes them as `has_executable_*` cfg flags and
//! `*_PATH` environment values, so the tests that need them are compiled
//! only where they can run.

fn main() {
    for flag in platform_checks::get_all_cfg_flags() {
        println!("cargo:rustc-check-cfg=cfg({})", flag);
    }

    platform_checks::perform_system_checks();

    // Re-run build script if environment changes
    println!("cargo:rerun-if-env-changed=PATH");
    println!("cargo:rerun-if-changed=build.rs");
}
