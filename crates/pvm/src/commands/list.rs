use std::io::Write;

use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;

pub async fn run(
    ctx: &Context,
    all: bool,
    refresh: bool,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let installed = ctx
        .activation
        .installed_versions()
        .map_err(|error| AppError::operation("list installed versions", error))?;
    let current = ctx
        .activation
        .current_version()
        .map_err(|error| AppError::operation("get current version", error))?;

    if all || refresh {
        let available = ctx
            .resolver
            .cache()
            .get_releases(refresh)
            .await
            .map_err(|error| AppError::operation("fetch available versions", error))?;

        if all {
            writeln!(out, "{}", output.info("Available versions:"))?;
            for version in &available {
                let marker = if current.as_deref() == Some(version.as_str()) {
                    output.current("→ ")
                } else if installed.contains(version) {
                    output.success("* ")
                } else {
                    "  ".to_string()
                };
                writeln!(out, "{marker}{version}")?;
            }
            write_legend(output, true, out)?;
            return Ok(());
        }
    }

    if installed.is_empty() {
        writeln!(
            out,
            "{}",
            output.warning("No versions installed. Use 'pvm install <version>' to install one.")
        )?;
        writeln!(
            out,
            "{}",
            output.info("Run 'pvm list --all' to see all available versions.")
        )?;
        return Ok(());
    }

    writeln!(out, "{}", output.info("Installed versions:"))?;
    for version in &installed {
        let marker = if current.as_deref() == Some(version.as_str()) {
            output.current("→ ")
        } else {
            "  ".to_string()
        };
        writeln!(out, "{marker}{version}")?;
    }
    write_legend(output, false, out)
}

fn write_legend(output: OutputConfig, all: bool, out: &mut impl Write) -> Result<(), AppError> {
    writeln!(out, "\n{}", output.info("Legend:"))?;
    writeln!(out, "{}", output.current("  →  current"))?;
    if all {
        writeln!(out, "{}", output.success("  *  installed"))?;
    }
    Ok(())
}
