// SPDX-License-Identifier: GPL-3.0-or-later

mod config;
mod exit_codes;
mod project;
