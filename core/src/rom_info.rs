//! ROM metadata reported by the emulator

use crate::text::BoundedText;

/// Usable bytes in each ROM info field.
pub const ROM_INFO_CAPACITY: usize = 47;

/// Placeholder stored for a field missing from the emulator output.
pub const NOT_FOUND: &str = "not found";

/// Number of MD5 characters used in the derived identifier.
pub const ID_MD5_PREFIX: usize = 8;

pub type RomField = BoundedText<ROM_INFO_CAPACITY>;

/// ROM identity scraped from the emulator's startup output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomInfo {
    /// Good name from the emulator's ROM database, e.g. `Mario Kart 64 (U) [!]`
    pub goodname: RomField,
    /// MD5 checksum in hex
    pub md5: RomField,
    pub country: RomField,
    /// Image type, e.g. `.z64 (native)`
    pub imagetype: RomField,
    /// `<goodname>-<md5[..8]>`
    pub id: RomField,
}

impl RomInfo {
    /// Recompute [`RomInfo::id`] from the good name and MD5.
    ///
    /// Works on sentinel values too, so the identifier is never stale.
    pub fn derive_id(&mut self) {
        let prefix: String = self.md5.chars().take(ID_MD5_PREFIX).collect();
        self.id.clear();
        self.id.push_str(&self.goodname);
        self.id.push_str("-");
        self.id.push_str(&prefix);
    }

    /// Whether a probe has filled this record yet.
    pub fn is_populated(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_id() {
        let mut info = RomInfo {
            goodname: RomField::from_truncated("Mario Kart 64 (U) [!]"),
            md5: RomField::from_truncated("3A67D9986F54EB282924FCA4CD5F6DFF"),
            ..Default::default()
        };
        info.derive_id();
        assert_eq!(info.id.as_str(), "Mario Kart 64 (U) [!]-3A67D998");
        assert!(info.is_populated());
    }

    #[test]
    fn test_derive_id_with_sentinels() {
        let mut info = RomInfo {
            goodname: RomField::from_truncated(NOT_FOUND),
            md5: RomField::from_truncated(NOT_FOUND),
            ..Default::default()
        };
        info.derive_id();
        assert_eq!(info.id.as_str(), "not found-not foun");
    }

    #[test]
    fn test_derive_id_is_bounded() {
        let mut info = RomInfo {
            goodname: RomField::from_truncated(&"G".repeat(60)),
            md5: RomField::from_truncated("0123456789ABCDEF"),
            ..Default::default()
        };
        info.derive_id();
        assert_eq!(info.goodname.len(), ROM_INFO_CAPACITY);
        assert_eq!(info.id.len(), ROM_INFO_CAPACITY);
        assert!(info.id.chars().all(|c| c == 'G'));
    }

    #[test]
    fn test_clear() {
        let mut info = RomInfo::default();
        info.goodname.set("Mario Kart 64");
        info.derive_id();
        info.clear();
        assert_eq!(info, RomInfo::default());
        assert!(!info.is_populated());
    }
}
