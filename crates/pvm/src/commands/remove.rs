use std::io::Write;

use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;

/// Removal takes the exact installed identifier; prefixes are not resolved.
pub fn run(
    ctx: &Context,
    version: &str,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    ctx.activation
        .remove(version)
        .map_err(|error| AppError::for_version("remove version", version, error))?;
    writeln!(out, "{}", output.success(&format!("Successfully removed Pulumi {version}")))?;
    Ok(())
}
