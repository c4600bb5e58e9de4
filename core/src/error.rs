//! Error types for the emulator supervisor

use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid caller configuration
    Configuration,
    /// Filesystem or allocation failure
    Resource,
    /// Spawn, signal or reap failure
    Process,
    /// The emulator reported a fatal error on its console
    Protocol,
}

/// Error type for supervisor operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required path was given as an empty string
    #[error("empty {0} path")]
    EmptyPath(&'static str),

    /// Binary or ROM path missing at commit/probe time
    #[error("{0} path not set")]
    PathNotSet(&'static str),

    /// Caller tried to pass the SRAM option directly
    #[error("setting \"{0}\" is not allowed, use a save context instead")]
    ReservedArgument(&'static str),

    /// Category not known to the save-directory resolver
    #[error("unknown save category '{0}'")]
    UnknownCategory(String),

    /// Save-kind outside default/user/recorded
    #[error("unknown save kind '{0}'")]
    UnknownSaveKind(String),

    /// No home directory could be determined
    #[error("home directory not available")]
    HomeDirUnavailable,

    /// Operation requires a committed command
    #[error("emulator command not committed")]
    NotCommitted,

    /// Directory creation failed
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The emulator could not be spawned
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The kill signal could not be delivered
    #[error("failed to kill emulator process {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: io::Error,
    },

    /// Reaping the emulator process failed
    #[error("failed to wait for emulator process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    /// Reading the emulator console failed
    #[error("failed to read emulator output: {0}")]
    Read(#[source] io::Error),

    /// No console output arrived within the read timeout
    #[error("no emulator output within {0:?}")]
    ReadTimeout(Duration),

    /// The emulator printed a fatal startup error
    #[error("emulator error: {0}")]
    Emulator(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPath(_)
            | Self::PathNotSet(_)
            | Self::ReservedArgument(_)
            | Self::UnknownCategory(_)
            | Self::UnknownSaveKind(_)
            | Self::HomeDirUnavailable
            | Self::NotCommitted => ErrorKind::Configuration,
            Self::CreateDir { .. } => ErrorKind::Resource,
            Self::Spawn { .. }
            | Self::Kill { .. }
            | Self::Wait { .. }
            | Self::Read(_)
            | Self::ReadTimeout(_) => ErrorKind::Process,
            Self::Emulator(_) => ErrorKind::Protocol,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
