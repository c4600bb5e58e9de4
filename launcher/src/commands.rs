//! Subcommand handlers

use std::path::Path;

use anyhow::{Context, Result, bail};
use mk64t_core::fs::ensure_directory;
use mk64t_core::{
    EmulatorSupervisor, SaveDirResolver, SaveKind, SupervisorConfig, TimeTrialSaveDirs,
    create_save_dirs,
};

use crate::cli::{InfoArgs, RunArgs};
use crate::config::{self, Config};

fn supervisor(
    config: &Config,
    paths: &SupervisorConfig,
    binary: Option<&str>,
    rom: &str,
) -> Result<EmulatorSupervisor> {
    let mut supervisor = EmulatorSupervisor::new(paths.clone());
    supervisor.set_binary(binary.unwrap_or(&config.emulator.binary))?;
    supervisor.set_rom(rom)?;
    Ok(supervisor)
}

/// `mk64t info`: probe the ROM and print its metadata.
pub fn info(config: &Config, paths: &SupervisorConfig, args: &InfoArgs) -> Result<()> {
    let mut supervisor = supervisor(config, paths, args.binary.as_deref(), &args.rom)?;
    supervisor
        .probe()
        .with_context(|| format!("failed to probe {}", args.rom))?;

    if let Some(warning) = supervisor.warning() {
        println!("Warning:   {}", warning);
    }
    println!("Goodname:  {}", supervisor.rom_goodname());
    println!("MD5:       {}", supervisor.rom_md5());
    println!("Country:   {}", supervisor.rom_country());
    println!("Imagetype: {}", supervisor.rom_imagetype());
    println!("ID:        {}", supervisor.rom_id());
    Ok(())
}

/// `mk64t run`: apply the save context, then commit, start and wait.
pub fn run(config: &Config, paths: &SupervisorConfig, args: &RunArgs) -> Result<()> {
    let category = match (&args.category, args.kind) {
        (Some(category), _) => category.as_str(),
        (None, SaveKind::Default) => "",
        (None, kind) => bail!("--category is required for {} saves", kind),
    };

    let mut supervisor = supervisor(config, paths, args.binary.as_deref(), &args.rom)?;
    for token in config.emulator.extra_args.iter().chain(&args.extra) {
        supervisor.add_argument(token)?;
    }
    supervisor.apply(category, args.kind)?;

    supervisor
        .commit()
        .with_context(|| format!("failed to prepare {}", args.rom))?;
    tracing::info!("Running {}", supervisor.rom_id());
    supervisor
        .start()
        .with_context(|| format!("failed to start {}", args.rom))?;
    supervisor.wait()?;

    if let Some(reason) = supervisor.last_exit() {
        println!("Emulator {}", reason);
    }
    supervisor.cleanup()?;
    Ok(())
}

/// `mk64t setup`: create every directory the launcher uses and a default
/// config file if there is none.
pub fn setup(config_path: Option<&Path>, paths: &SupervisorConfig) -> Result<()> {
    let dirs = TimeTrialSaveDirs::new();
    let base = paths.save_base_dir();
    create_save_dirs(&dirs, &base, paths.dir_mode)?;
    ensure_directory(&paths.mupen_config_dir(), paths.dir_mode)?;
    println!(
        "Created {} save categories under {}",
        dirs.count_categories(),
        base.display()
    );

    let config_path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => config::default_path(),
    };
    if let Some(path) = config_path.filter(|path| !path.exists()) {
        config::save(&Config::default(), &path)?;
        println!("Wrote default config to {}", path.display());
    }
    Ok(())
}

/// `mk64t categories`: list every category the save layout knows.
pub fn categories() {
    for category in TimeTrialSaveDirs::new().categories() {
        println!("{}", category);
    }
}
