// SPDX-License-Identifier: GPL-3.0-or-later

use std::env;
use std::process::ExitCode;
use testrun::{args, config, context, session};

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Initialize the logging system.
    env_logger::init();
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");
    let os = env::consts::OS;
    let family = env::consts::FAMILY;
    let arch = env::consts::ARCH;
    log::info!("Running on... {family}/{os} {arch}");

    // Parse the command line arguments.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;
    log::info!("{arguments}");
    // Capture application context.
    let context = context::Context::capture()?;
    log::info!("{context}");
    // Load the configuration.
    let configuration = config::Loader::load(&context)?;
    log::info!("{configuration}");

    // Run the application.
    let session = session::Session::configure(&context, arguments, configuration)?;
    log::debug!("Configuration complete, building the project now...");
    let result = session.run(std::io::stdout().lock());
    log::debug!("Exit code: {result:?}");

    Ok(result)
}
