//! Save context: where the emulator keeps SRAM for the current race
//!
//! A save context pairs a category with a [`SaveKind`] and turns them into
//! the single `Core[SaveSRAMPath]=<dir>` assignment passed to the emulator.

mod dirs;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use dirs::{FORMATS, SaveDirResolver, TRACKS, TimeTrialSaveDirs, create_save_dirs};

use crate::error::{Error, Result};
use crate::text::BoundedText;

/// Usable bytes in a category name.
pub const CATEGORY_CAPACITY: usize = 11;

/// Kind of save data the emulator should read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SaveKind {
    /// Regular save RAM, one directory per ROM
    #[default]
    Default,
    /// Ghost data the user saved, one directory per ROM inside the category
    UserGhost,
    /// Pre-recorded ghosts, shared by every ROM in the category
    RecordedGhost,
}

impl SaveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveKind::Default => "default",
            SaveKind::UserGhost => "user",
            SaveKind::RecordedGhost => "recorded",
        }
    }

    /// Whether saves of this kind get a per-ROM subdirectory that the
    /// supervisor creates.
    pub fn is_per_rom(&self) -> bool {
        !matches!(self, SaveKind::RecordedGhost)
    }
}

impl fmt::Display for SaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for SaveKind {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(SaveKind::Default),
            1 => Ok(SaveKind::UserGhost),
            2 => Ok(SaveKind::RecordedGhost),
            other => Err(Error::UnknownSaveKind(other.to_string())),
        }
    }
}

impl FromStr for SaveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "def" => Ok(SaveKind::Default),
            "user" | "usr" | "user-ghost" => Ok(SaveKind::UserGhost),
            "recorded" | "rec" | "recorded-ghost" => Ok(SaveKind::RecordedGhost),
            _ => Err(Error::UnknownSaveKind(s.to_string())),
        }
    }
}

/// Accepted save context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveContext {
    /// Category the context was applied with
    pub category: BoundedText<CATEGORY_CAPACITY>,
    /// Kind of save data
    pub kind: SaveKind,
    /// Directory relative to the save base, as returned by the resolver
    pub resolved_dir: PathBuf,
    /// Absolute save path; `None` while waiting for the ROM identifier
    pub save_path: Option<PathBuf>,
}

impl SaveContext {
    pub fn new(category: &str, kind: SaveKind, resolved_dir: PathBuf) -> Self {
        let mut stored = BoundedText::new();
        if stored.push_str(category) {
            tracing::warn!("Save category \"{}\" truncated to \"{}\"", category, stored);
        }
        Self {
            category: stored,
            kind,
            resolved_dir,
            save_path: None,
        }
    }

    /// Whether the save path still depends on an unknown ROM identifier.
    pub fn is_pending(&self) -> bool {
        self.save_path.is_none()
    }
}

/// Compute the save path for a resolved directory.
///
/// Per-ROM kinds append `rom_id` so different ROMs never share SRAM.
pub fn save_path(base: &Path, resolved_dir: &Path, kind: SaveKind, rom_id: &str) -> PathBuf {
    let dir = base.join(resolved_dir);
    if kind.is_per_rom() {
        dir.join(rom_id)
    } else {
        dir
    }
}
