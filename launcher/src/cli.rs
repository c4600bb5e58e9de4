//! Command-line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mk64t_core::SaveKind;

/// mk64t - Mario Kart 64 time-trial launcher for mupen64plus
#[derive(Parser)]
#[command(name = "mk64t")]
#[command(about = "Mario Kart 64 time-trial launcher for mupen64plus")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.config/mk64t/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a ROM and print what the emulator reports about it
    Info(InfoArgs),

    /// Run a ROM with its saves pointed at a category directory
    Run(RunArgs),

    /// Create the config directory and every save directory
    Setup,

    /// List the known save categories
    Categories,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Emulator binary (overrides the config file)
    #[arg(long = "bin")]
    pub binary: Option<String>,

    /// ROM file
    pub rom: String,
}

#[derive(Args)]
pub struct RunArgs {
    /// Emulator binary (overrides the config file)
    #[arg(long = "bin")]
    pub binary: Option<String>,

    /// Save category, e.g. LR_3lap (required for ghost saves)
    #[arg(long)]
    pub category: Option<String>,

    /// Save kind: default, user or recorded
    #[arg(long, default_value = "default")]
    pub kind: SaveKind,

    /// ROM file
    pub rom: String,

    /// Extra emulator arguments
    #[arg(last = true)]
    pub extra: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "mk64t",
            "run",
            "--category",
            "LR_3lap",
            "--kind",
            "user",
            "mk64.z64",
            "--",
            "--windowed",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.category.as_deref(), Some("LR_3lap"));
        assert_eq!(args.kind, SaveKind::UserGhost);
        assert_eq!(args.rom, "mk64.z64");
        assert_eq!(args.extra, ["--windowed"]);
        assert_eq!(args.binary, None);
    }

    #[test]
    fn test_parse_run_defaults_to_default_kind() {
        let cli = Cli::try_parse_from(["mk64t", "run", "mk64.z64"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.kind, SaveKind::Default);
        assert!(args.extra.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["mk64t", "run", "--kind", "ghost", "mk64.z64"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "mk64t",
            "info",
            "--bin",
            "/bin/m64",
            "mk64.z64",
            "--config",
            "/tmp/c.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        let Commands::Info(args) = cli.command else {
            panic!("expected info");
        };
        assert_eq!(args.binary.as_deref(), Some("/bin/m64"));
    }
}
