#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss, clippy::module_name_repetitions)]

mod commands;
mod options;

pub use options::*;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

#[derive(Parser, Debug)]
#[command(version, about = "Renders bitmap font text overlays from romtext profiles", long_about = None)]
pub struct Cli {
    /// Also print info messages to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Renders the current state of a profile to a PNG
    Render {
        /// Profile JSON
        profile: PathBuf,

        /// Output file
        #[arg(long, short, default_value = romtext_engine::batch::SINGLE_FILE_NAME)]
        output: PathBuf,

        /// Show the original background instead of the editable one
        #[arg(long, default_value_t = false)]
        original: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Exports one frame per batch line as a zip of PNGs
    Batch {
        /// Profile JSON
        profile: PathBuf,

        /// Output directory
        #[arg(long, short, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Prints the module under a point of the canvas
    Hit {
        /// Profile JSON
        profile: PathBuf,
        x: f32,
        y: f32,

        /// Treat the point as preview (zoomed) coordinates
        #[arg(long, default_value_t = false)]
        screen: bool,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Drags the module under a preview point and writes the updated profile
    Drag {
        /// Profile JSON
        profile: PathBuf,

        /// Start point in preview coordinates, `x,y`
        #[arg(long, value_parser = parse_point)]
        from: (f32, f32),

        /// End point in preview coordinates, `x,y`
        #[arg(long, value_parser = parse_point)]
        to: (f32, f32),

        /// Output profile, defaults to overwriting the input
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },
}

fn parse_point(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value.split_once(',').ok_or_else(|| format!("expected x,y, got '{value}'"))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn get_log_dir() -> Option<PathBuf> {
    let dir = Options::get_config_dir()?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

fn start_logger(verbose: bool) -> Option<LoggerHandle> {
    let duplicate = if verbose { Duplicate::Info } else { Duplicate::Warn };
    let logger = match Logger::try_with_env_or_str("info") {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("Failed to initialize logging: {err}");
            return None;
        }
    };
    let result = if let Some(log_dir) = get_log_dir() {
        logger
            .log_to_file(FileSpec::default().directory(&log_dir).basename(APP_NAME).suffix("log").suppress_timestamp())
            .rotate(Criterion::Size(64 * 1024), Naming::Numbers, Cleanup::KeepLogFiles(3))
            .duplicate_to_stderr(duplicate)
            .start()
    } else {
        eprintln!("Failed to create log file");
        logger.log_to_stderr().start()
    };
    result.map_err(|err| eprintln!("Failed to start logger: {err}")).ok()
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut options = Options::load_options();
    match cli.command {
        Commands::Render {
            profile,
            output,
            original,
            overrides,
        } => {
            options.apply_overrides(&overrides)?;
            commands::render(&profile, &output, original, &options)
        }
        Commands::Batch { profile, output, overrides } => {
            options.apply_overrides(&overrides)?;
            commands::batch(&profile, &output, &options)
        }
        Commands::Hit {
            profile,
            x,
            y,
            screen,
            overrides,
        } => {
            options.apply_overrides(&overrides)?;
            commands::hit(&profile, (x, y), screen, &options)
        }
        Commands::Drag {
            profile,
            from,
            to,
            output,
            overrides,
        } => {
            options.apply_overrides(&overrides)?;
            let output = output.unwrap_or_else(|| profile.clone());
            commands::drag(&profile, from, to, &output, &options)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let logger = start_logger(cli.verbose);
    log::info!("Starting romtext {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = run(cli) {
        // errors reach stderr through the logger's duplication
        if logger.is_some() {
            log::error!("{err:#}");
        } else {
            eprintln!("Error: {err:#}");
        }
        drop(logger);
        std::process::exit(1);
    }
}
