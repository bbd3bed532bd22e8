use std::io::Write;

use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;

pub fn run(ctx: &Context, output: OutputConfig, out: &mut impl Write) -> Result<(), AppError> {
    let current = ctx
        .activation
        .current_version()
        .map_err(|error| AppError::operation("get current version", error))?;

    match current {
        Some(version) => writeln!(out, "Current Pulumi version: {}", output.current(&version))?,
        None => writeln!(
            out,
            "No Pulumi version currently selected. Use 'pvm use <version>' to select one."
        )?,
    }
    Ok(())
}
