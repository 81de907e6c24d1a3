// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod config;
pub mod context;
pub mod environment;
pub mod project;
pub mod report;
pub mod session;
pub mod suite;
pub mod supervise;

#[cfg(test)]
mod testing;
