//! mk64t core - mupen64plus process supervision
//!
//! This crate runs the mupen64plus emulator as a child process on a
//! pseudo-terminal, learns which ROM it loaded by scraping its console, and
//! points its save RAM at per-category, per-ROM directories.
//!
//! # Architecture
//!
//! - [`ArgumentList`] - Caller-built command line (binary, tokens, ROM)
//! - [`EmulatorSupervisor`] - Commit/start/wait/stop lifecycle of one emulator
//! - [`SaveDirResolver`] - Maps a category and [`SaveKind`] to a save directory
//! - [`scraper`] - Extracts ROM metadata and errors from console output
//! - [`ProcessBackend`] - Spawn/kill/reap capability, [`PtyBackend`] in production

pub mod args;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod process;
pub mod rom_info;
pub mod save;
pub mod scraper;
pub mod supervisor;
#[cfg(test)]
pub mod test_utils;
pub mod text;

pub use args::{ArgEntry, ArgumentList, CONFIG_DIR_FLAG, SRAM_KEY};
pub use command::CommittedCommand;
pub use config::SupervisorConfig;
pub use diagnostics::Diagnostics;
pub use error::{Error, ErrorKind, Result};
pub use process::{ExitReason, KillOutcome, ProcessBackend, PtyBackend};
pub use rom_info::RomInfo;
pub use save::{SaveContext, SaveDirResolver, SaveKind, TimeTrialSaveDirs, create_save_dirs};
pub use scraper::ProbeReport;
pub use supervisor::{EmulatorSupervisor, LifecycleState};
pub use text::BoundedText;
