use chrono::Local;
use colored::*;
use log::{Level, LevelFilter};
use std::path::{Path, PathBuf};

const LOGS_PREFIX: &str = "tinybasic_log";
const SEPARATOR: &str = "_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const LOG_EXTENSION: &str = "log";
const CONSOLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn generate_filename_only() -> String {
    let now = Local::now();
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    format!("{}{}{}.{}", LOGS_PREFIX, SEPARATOR, timestamp, LOG_EXTENSION)
}

fn ensure_log_directory_exists(log_dir: &Path) -> std::io::Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }
    Ok(())
}

/// Maps a `-v` count to a console level, starting from `Warn`.
///
/// `quiet` wins over any verbosity and keeps only errors.
pub fn level_from_verbosity(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger.
///
/// Console output goes to stderr so that whatever the interpreted program
/// prints on stdout is never interleaved with log lines. When `log_dir` is
/// given, a timestamped file is created there as a second sink.
pub fn init(
    log_dir: Option<impl AsRef<Path>>,
    console_level: LevelFilter,
    file_level: LevelFilter,
) -> Result<(), fern::InitError> {

    let mut log_file_path: Option<PathBuf> = None;

    if let Some(dir) = log_dir {
        let dir_path = dir.as_ref();
        if let Err(e) = ensure_log_directory_exists(dir_path) {
            eprintln!("CRITICAL: could not create log directory '{}': {}", dir_path.display(), e);
            return Err(fern::InitError::Io(std::io::Error::other(
                format!("could not create log directory '{}': {}", dir_path.display(), e),
            )));
        }
        log_file_path = Some(dir_path.join(generate_filename_only()));
    }

    let console_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let level_str = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN ".yellow().bold(),
                Level::Info => "INFO ".green().bold(),
                Level::Debug => "DEBUG".blue().bold(),
                Level::Trace => "TRACE".magenta().bold(),
            };

            let timestamp = Local::now().format(CONSOLE_TIMESTAMP_FORMAT).to_string();
            let target = record.target();

            out.finish(format_args!(
                "[{}] [{}] [{}] {}",
                timestamp,
                level_str,
                target,
                message
            ))
        })
        .level(console_level)
        .chain(std::io::stderr());

    let mut base_dispatch = fern::Dispatch::new()
        .level(console_level.max(file_level))
        .chain(console_dispatch);

    if let Some(path) = &log_file_path {
        let file_dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                let timestamp = Local::now().format(CONSOLE_TIMESTAMP_FORMAT).to_string();
                let target = record.target();
                out.finish(format_args!(
                    "[{}] [{:<5}] [{}] [{}:{}] {}",
                    timestamp,
                    record.level(),
                    target,
                    record.file().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    message
                ))
            })
            .level(file_level)
            .chain(fern::log_file(path)?);

        base_dispatch = base_dispatch.chain(file_dispatch);
    }

    base_dispatch.apply()?;

    log::info!("Logger initialised. Console level: {}, file level: {}", console_level, file_level);
    if let Some(path) = &log_file_path {
        log::info!("Writing log file: {}", path.display());
    } else {
        log::debug!("File logging disabled.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0, false), LevelFilter::Warn);
        assert_eq!(level_from_verbosity(1, false), LevelFilter::Info);
        assert_eq!(level_from_verbosity(2, false), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(9, false), LevelFilter::Trace);
    }

    #[test]
    fn quiet_overrides_verbosity() {
        assert_eq!(level_from_verbosity(3, true), LevelFilter::Error);
    }

    #[test]
    fn log_file_names_carry_prefix_and_extension() {
        let name = generate_filename_only();
        assert!(name.starts_with("tinybasic_log_"));
        assert!(name.ends_with(".log"));
    }
}
