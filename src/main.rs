use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use log::{LevelFilter, debug};
use commands::parse::{Format, parse};
use commands::repl::repl;
use commands::run::run;
use config::{Config, load_config};
use session::Flow;

mod commands;
mod config;
mod session;

#[derive(Parser, Debug)]
#[command(name = "tinybasic")]
#[command(about = "A small structured BASIC interpreter. Blocks end at a blank line.")]
struct Cli {
    /// TOML file with [session] and [logging] tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write a timestamped log file into this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    subcommand: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read blocks from stdin (default).
    Repl,
    /// Run a source file block by block.
    Run {
        file: PathBuf,
    },
    /// Parse a source file and print its tree without running it.
    Parse {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Tree)]
        format: Format,
    },
}

fn init_logging(cli: &Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let console_level = if cli.verbose > 0 || cli.quiet {
        tinybasic_logger::level_from_verbosity(cli.verbose, cli.quiet)
    } else {
        config.logging.level()?.unwrap_or(LevelFilter::Warn)
    };
    let file_level = config.logging.file_level()?.unwrap_or(LevelFilter::Debug);
    let log_dir = cli.log_dir.as_ref().or(config.logging.dir.as_ref());

    tinybasic_logger::init(log_dir, console_level, file_level)?;
    Ok(())
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    init_logging(&cli, &config)?;
    debug!("configuration: {:?}", config);

    let flow = match cli.subcommand {
        Some(Commands::Run { file }) => run(&file, config.session)?,
        Some(Commands::Parse { file, format }) => parse(&file, format)?,
        Some(Commands::Repl) | None => repl(config.session)?,
    };

    match flow {
        Flow::Finished => Ok(ExitCode::SUCCESS),
        Flow::Exited => Ok(ExitCode::FAILURE),
    }
}
