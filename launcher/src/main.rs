//! mk64t launcher
//!
//! Runs Mario Kart 64 in mupen64plus with save RAM redirected to a
//! per-category, per-ROM directory, so time-trial ghosts for every track
//! and format live side by side.
//!
//! # Commands
//!
//! - `mk64t info <ROM>` - Print what the emulator reports about a ROM
//! - `mk64t run [--category C] [--kind K] <ROM> [-- EXTRA...]` - Play
//! - `mk64t setup` - Create the config and save directories
//! - `mk64t categories` - List save categories

mod cli;
mod commands;
mod config;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use mk64t_core::SupervisorConfig;
use mk64t_core::fs::ensure_directory;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let paths = SupervisorConfig::from_env()?.with_read_timeout(config.emulator.read_timeout());

    init_logging(&config, &paths)?;

    match &cli.command {
        Commands::Info(args) => commands::info(&config, &paths, args),
        Commands::Run(args) => commands::run(&config, &paths, args),
        Commands::Setup => commands::setup(cli.config.as_deref(), &paths),
        Commands::Categories => {
            commands::categories();
            Ok(())
        }
    }
}

/// Log to stderr, and to the log file when enabled.
///
/// `RUST_LOG` overrides the configured filter.
fn init_logging(config: &config::Config, paths: &SupervisorConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));

    let file_layer = if config.log.file {
        let path = paths.log_path();
        if let Some(dir) = path.parent() {
            ensure_directory(dir, paths.dir_mode)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}
