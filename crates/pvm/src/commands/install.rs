use std::io::Write;

use log::info;

use super::{resolve, use_version};
use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;

pub async fn run(
    ctx: &Context,
    specifier: &str,
    use_after: bool,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let version = resolve(ctx, specifier).await?;
    install_resolved(ctx, &version, output, out).await?;

    if use_after {
        use_version::activate(ctx, &version, output, out)?;
    } else {
        writeln!(out, "\nTo use this version, run: pvm use {version}")?;
    }
    Ok(())
}

/// Install an already-resolved version, replacing any existing copy.
pub async fn install_resolved(
    ctx: &Context,
    version: &str,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    if ctx.activation.is_installed(version) {
        info!("Pulumi {version} is already installed, reinstalling");
    }

    ctx.installer
        .install(version)
        .await
        .map_err(|error| AppError::for_version("install", version, error))?;
    writeln!(out, "{}", output.success(&format!("Successfully installed Pulumi {version}")))?;
    Ok(())
}
