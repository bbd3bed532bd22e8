//! pvm: Pulumi Version Manager.
//!
//! Installs Pulumi CLI releases under `~/.pvm/versions` (or `$PVM_DIR`) and
//! switches between them by relinking `~/.pvm/bin`.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod output;
mod settings;

use clap::Parser;
use pvm_platform::ToolPaths;

use crate::cli::{Cli, Command};
use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;
use crate::settings::PvmSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let no_color_env = std::env::var("NO_COLOR").ok();
    let output = OutputConfig::from_flags(cli.no_color, no_color_env.as_deref());

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(error) = run(cli, output).await {
        eprintln!("{}", output.error(&format!("Error: {error}")));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: OutputConfig) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    if cli.command == Command::Version {
        return commands::print_version(&mut stdout);
    }

    let paths = ToolPaths::new()?;
    let settings = PvmSettings::load_from_path(&paths.settings_file());
    logging::init_logging(
        &paths.log_file(),
        cli.verbose,
        settings.debug_logging,
        settings.max_log_size_bytes,
    );
    log::debug!("Using tool root {}", paths.root.display());

    let ctx = Context::new(paths, &settings)?;
    commands::execute(cli.command, &ctx, output, &mut stdout).await
}
