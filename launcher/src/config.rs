//! Launcher configuration (~/.config/mk64t/config.toml)
//!
//! Missing file or missing keys fall back to defaults. A file that exists
//! but does not parse is an error, so a typo never silently resets settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Emulator binary and command line
    #[serde(default)]
    pub emulator: EmulatorConfig,
    /// Log output
    #[serde(default)]
    pub log: LogConfig,
}

/// Emulator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Emulator binary, looked up on `PATH` if not absolute (default: mupen64plus)
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Extra arguments passed before the ROM on every run
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Give up on a silent emulator after this many seconds (default: wait forever)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout_secs: Option<u64>,
}

/// Log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Also write logs to ~/.local/share/mk64t/log (default: true)
    #[serde(default = "default_true")]
    pub file: bool,
    /// Filter used when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_binary() -> String {
    "mupen64plus".to_string()
}
fn default_true() -> bool {
    true
}
fn default_filter() -> String {
    "info".to_string()
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            extra_args: Vec::new(),
            read_timeout_secs: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_true(),
            filter: default_filter(),
        }
    }
}

impl EmulatorConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/mk64t`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mk64t").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of the config file.
pub fn default_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Load the config from `path`, or from [`default_path`] if `None`.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) => path,
            None => return Ok(Config::default()),
        },
    };
    load_from(&path)
}

fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Write `config` to `path`, creating parent directories.
pub fn save(config: &Config, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.emulator.binary, "mupen64plus");
        assert!(config.emulator.extra_args.is_empty());
        assert_eq!(config.emulator.read_timeout(), None);
        assert!(config.log.file);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_emulator() {
        let toml_str = r#"
[emulator]
extra_args = ["--nosaveoptions", "--windowed"]
read_timeout_secs = 15
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.emulator.binary, "mupen64plus"); // default
        assert_eq!(config.emulator.extra_args, ["--nosaveoptions", "--windowed"]);
        assert_eq!(config.emulator.read_timeout(), Some(Duration::from_secs(15)));
        assert!(config.log.file); // default
    }

    // =============================================================
    // File tests
    // =============================================================

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[emulator\nbinary = ").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = Config::default();
        config.emulator.binary = "/opt/mupen64plus/bin/mupen64plus".to_string();
        config.log.file = false;

        save(&config, &path).unwrap();
        assert_eq!(load(Some(&path)).unwrap(), config);
    }
}
