mod current;
mod install;
mod list;
mod remove;
mod use_version;

use std::io::Write;

use crate::cli::Command;
use crate::context::Context;
use crate::error::AppError;
use crate::output::OutputConfig;

/// Run one subcommand to completion, writing user-facing output to `out`.
pub async fn execute(
    command: Command,
    ctx: &Context,
    output: OutputConfig,
    out: &mut impl Write,
) -> Result<(), AppError> {
    match command {
        Command::Install { version, use_after } => {
            install::run(ctx, &version, use_after, output, out).await
        }
        Command::Use { version, install } => {
            use_version::run(ctx, &version, install, output, out).await
        }
        Command::List { all, refresh } => list::run(ctx, all, refresh, output, out).await,
        Command::Current => current::run(ctx, output, out),
        Command::Remove { version } => remove::run(ctx, &version, output, out),
        Command::Version => print_version(out),
    }
}

pub fn print_version(out: &mut impl Write) -> Result<(), AppError> {
    writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

async fn resolve(ctx: &Context, specifier: &str) -> Result<String, AppError> {
    ctx.resolver
        .resolve(specifier)
        .await
        .map_err(|error| AppError::for_version("resolve version", specifier, error))
}

#[cfg(test)]
pub(crate) mod test_support {
    use mockito::ServerGuard;
    use pvm_platform::{PRIMARY_BINARY, ToolPaths};

    use crate::context::Context;
    use crate::settings::PvmSettings;

    pub(crate) fn context(root: &std::path::Path, server: &ServerGuard) -> Context {
        let settings = PvmSettings {
            registry_api_url: format!("{}/api", server.url()),
            download_base_url: format!("{}/download", server.url()),
            ..PvmSettings::default()
        };
        Context::with_token(ToolPaths::with_root(root), &settings, None)
            .expect("context should be built")
    }

    pub(crate) fn install_fake(paths: &ToolPaths, version: &str) {
        let dir = paths.version_dir(version);
        std::fs::create_dir_all(&dir).expect("version directory should be created");
        std::fs::write(dir.join(PRIMARY_BINARY), version).expect("fake binary should be written");
    }

    pub(crate) fn release_tarball(version: &str) -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let body = format!("pulumi {version}");
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("pulumi/{PRIMARY_BINARY}"), body.as_bytes())
            .expect("tar entry should be written");
        builder
            .into_inner()
            .expect("tar archive should be finalized")
            .finish()
            .expect("gzip stream should be finalized")
    }

    pub(crate) fn text(out: Vec<u8>) -> String {
        String::from_utf8(out).expect("output should be UTF-8")
    }
}
