//! Supervisor configuration context
//!
//! The home directory and read timeout are threaded into the supervisor at
//! construction. Nothing in the core looks up `$HOME` on its own.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Emulator config directory, relative to the home directory.
pub const MUPEN_CONFIG_DIR: &str = ".config/mk64t/mupen64plus/config";

/// Data directory holding saves and the log file, relative to the home directory.
pub const DATA_DIR: &str = ".local/share/mk64t";

/// Log file name inside [`DATA_DIR`].
pub const LOG_FILE_NAME: &str = "log";

/// Permission bits for every directory the supervisor creates.
pub const DIR_MODE: u32 = 0o755;

/// Configuration context for an [`EmulatorSupervisor`](crate::EmulatorSupervisor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// User home directory all default paths derive from
    pub home: PathBuf,
    /// Maximum time to wait for each chunk of console output (`None` waits forever)
    pub read_timeout: Option<Duration>,
    /// Mode for created directories
    pub dir_mode: u32,
}

impl SupervisorConfig {
    /// Create a configuration rooted at an explicit home directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            read_timeout: None,
            dir_mode: DIR_MODE,
        }
    }

    /// Create a configuration for the current user.
    ///
    /// Fails with [`Error::HomeDirUnavailable`] if no home directory can be
    /// determined.
    pub fn from_env() -> Result<Self> {
        let dirs = directories::BaseDirs::new().ok_or(Error::HomeDirUnavailable)?;
        Ok(Self::new(dirs.home_dir()))
    }

    /// Set the per-read console timeout.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Directory passed to the emulator as `--configdir`.
    pub fn mupen_config_dir(&self) -> PathBuf {
        self.home.join(MUPEN_CONFIG_DIR)
    }

    /// Base directory that save paths are resolved against.
    pub fn save_base_dir(&self) -> PathBuf {
        self.home.join(DATA_DIR)
    }

    /// Default log file location.
    pub fn log_path(&self) -> PathBuf {
        self.save_base_dir().join(LOG_FILE_NAME)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
