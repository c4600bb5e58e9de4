//! Save directory layout
//!
//! Maps a time-trial category and save-kind to a directory relative to the
//! save base (`~/.local/share/mk64t`):
//!
//! - `Default` saves share `saves/default` regardless of category
//! - user ghosts live in `saves/user/<category>`
//! - recorded ghosts live in `saves/recorded/<category>`

use std::path::{Path, PathBuf};

use super::SaveKind;
use crate::error::{Error, Result};
use crate::fs::ensure_directory;

/// Track abbreviations, in cup order.
pub const TRACKS: [&str; 16] = [
    "LR", "MMF", "KTB", "KD", // Mushroom Cup
    "TT", "FS", "CM", "MR", // Flower Cup
    "WS", "SL", "RRy", "BC", // Star Cup
    "DKJP", "YV", "BB", "RRd", // Special Cup
];

/// Time-trial formats recorded per track.
pub const FORMATS: [&str; 2] = ["3lap", "flap"];

const SAVES_DIR: &str = "saves";
const DEFAULT_DIR: &str = "default";

/// Trait for resolving save directories.
///
/// Implementations decide the on-disk layout; the supervisor only joins the
/// returned relative path onto its save base.
pub trait SaveDirResolver: Send + Sync {
    /// Directory for `category` and `kind`, relative to the save base.
    ///
    /// Fails with [`Error::UnknownCategory`] for a category the resolver does
    /// not know. `Default` ignores the category.
    fn resolve_path(&self, category: &str, kind: SaveKind) -> Result<PathBuf>;

    /// Number of known categories.
    fn count_categories(&self) -> usize;

    /// Directory for category-less saves, relative to the save base.
    fn default_path(&self) -> PathBuf;
}

/// Built-in layout covering every track in 3-lap and flap format.
#[derive(Debug, Clone)]
pub struct TimeTrialSaveDirs {
    categories: Vec<String>,
}

impl Default for TimeTrialSaveDirs {
    fn default() -> Self {
        let categories = TRACKS
            .iter()
            .flat_map(|track| FORMATS.iter().map(move |format| format!("{track}_{format}")))
            .collect();
        Self { categories }
    }
}

impl TimeTrialSaveDirs {
    pub fn new() -> Self {
        Self::default()
    }

    /// All category names, e.g. `LR_3lap`.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn is_known(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

impl SaveDirResolver for TimeTrialSaveDirs {
    fn resolve_path(&self, category: &str, kind: SaveKind) -> Result<PathBuf> {
        let kind_dir = match kind {
            SaveKind::Default => return Ok(self.default_path()),
            SaveKind::UserGhost => "user",
            SaveKind::RecordedGhost => "recorded",
        };
        if !self.is_known(category) {
            return Err(Error::UnknownCategory(category.to_string()));
        }
        Ok(Path::new(SAVES_DIR).join(kind_dir).join(category))
    }

    fn count_categories(&self) -> usize {
        self.categories.len()
    }

    fn default_path(&self) -> PathBuf {
        Path::new(SAVES_DIR).join(DEFAULT_DIR)
    }
}

/// Create the default directory plus every user and recorded category
/// directory under `base`.
pub fn create_save_dirs(dirs: &TimeTrialSaveDirs, base: &Path, mode: u32) -> Result<()> {
    ensure_directory(&base.join(dirs.default_path()), mode)?;
    for category in dirs.categories() {
        for kind in [SaveKind::UserGhost, SaveKind::RecordedGhost] {
            ensure_directory(&base.join(dirs.resolve_path(category, kind)?), mode)?;
        }
    }
    tracing::info!(
        "Save directories ready under {} ({} categories)",
        base.display(),
        dirs.count_categories()
    );
    Ok(())
}
