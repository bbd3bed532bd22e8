use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

/// Cut an oversized log down to its newest `max_log_size / 2` bytes,
/// starting on a line boundary. Returns whether the file was rewritten.
fn cap_log_file(log_path: &Path, max_log_size: u64) -> io::Result<bool> {
    let mut file = match File::open(log_path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(error),
    };
    let len = file.metadata()?.len();
    if len <= max_log_size {
        return Ok(false);
    }

    file.seek(SeekFrom::Start(len - max_log_size / 2))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;
    drop(file);

    let start = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(tail.len(), |pos| pos + 1);
    std::fs::write(log_path, &tail[start..])?;
    Ok(true)
}

fn open_log_file(log_path: &Path) -> io::Result<File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_path)
}

fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Install the process logger.
///
/// Warnings always reach stderr; `verbose` lowers the terminal level to
/// debug. The log file under the tool root is written only when `verbose`
/// or `file_logging` is set.
pub fn init_logging(log_path: &Path, verbose: bool, file_logging: bool, max_log_size: u64) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("pvm")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        terminal_level(verbose),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    let file_enabled = verbose || file_logging;
    let mut file_error = None;
    if file_enabled {
        let opened = cap_log_file(log_path, max_log_size).and_then(|_| open_log_file(log_path));
        match opened {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(error) => file_error = Some(error),
        }
    }

    let _ = CombinedLogger::init(loggers);
    log::set_max_level(if file_enabled {
        LevelFilter::Debug
    } else {
        terminal_level(verbose)
    });

    match file_error {
        Some(error) => log::warn!("Cannot write log file {}: {error}", log_path.display()),
        None if file_enabled => {
            log::debug!("Debug logging initialized, log file: {}", log_path.display());
        }
        None => {}
    }
}
