use std::io::Write;
use std::path::Path;

use log::debug;
use pvm_platform::PRIMARY_BINARY;

use super::{install, resolve};
use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;

pub async fn run(
    ctx: &Context,
    specifier: &str,
    install_missing: bool,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let version = resolve(ctx, specifier).await?;
    if install_missing && !ctx.activation.is_installed(&version) {
        install::install_resolved(ctx, &version, output, out).await?;
    }
    activate(ctx, &version, output, out)
}

/// Switch to an installed version and warn when `PATH` would not pick it up.
pub fn activate(
    ctx: &Context,
    version: &str,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    ctx.activation
        .activate(version)
        .map_err(|error| AppError::for_version("switch to version", version, error))?;
    writeln!(out, "{}", output.success(&format!("Switched to Pulumi {version}")))?;

    let bin_dir = ctx.paths.bin_dir();
    let found = which::which(PRIMARY_BINARY).ok();
    debug!("{PRIMARY_BINARY} on PATH resolves to {found:?}");
    if let Some(warning) = path_warning(found.as_deref(), &bin_dir) {
        writeln!(out, "{}", output.warning(&warning))?;
    }
    Ok(())
}

fn path_warning(found: Option<&Path>, bin_dir: &Path) -> Option<String> {
    let bin_dir = std::path::absolute(bin_dir).unwrap_or_else(|_| bin_dir.to_path_buf());
    let managed = found
        .and_then(Path::parent)
        .and_then(|dir| std::path::absolute(dir).ok())
        .is_some_and(|dir| dir == bin_dir);
    if managed {
        return None;
    }
    Some(format!(
        "{PRIMARY_BINARY} on your PATH is not the managed version. Add {} to your PATH.",
        bin_dir.display()
    ))
}
