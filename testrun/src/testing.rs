// SPDX-License-Identifier: GPL-3.0-or-later

//! Helpers for the unit tests.

use crate::supervise::Captured;
use std::process::ExitStatus;

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

pub fn captured(code: i32, stdout: &str, stderr: &str) -> Captured {
    Captured { status: exit_status(code), stdout: stdout.to_string(), stderr: stderr.to_string() }
}
