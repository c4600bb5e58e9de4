//! Committed emulator command
//!
//! A spawn-ready command built from an [`ArgumentList`]. The ROM path and
//! the SRAM assignment are named slots that can be replaced without
//! rebuilding the rest of the command.

use crate::args::{ArgEntry, ArgumentList};
use crate::error::{Error, Result};

/// Finalized emulator command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedCommand {
    binary: String,
    entries: Vec<ArgEntry>,
    rom: String,
}

impl CommittedCommand {
    /// Build from `list`, appending `extra` after the caller's entries.
    ///
    /// Fails if the binary or ROM path is missing.
    pub fn build(list: &ArgumentList, extra: impl IntoIterator<Item = ArgEntry>) -> Result<Self> {
        let binary = list.binary().ok_or(Error::PathNotSet("emulator binary"))?;
        let rom = list.rom().ok_or(Error::PathNotSet("ROM"))?;

        let mut entries = list.entries().to_vec();
        entries.extend(extra);

        Ok(Self {
            binary: binary.to_string(),
            entries,
            rom: rom.to_string(),
        })
    }

    /// Command used for a probe run: binary and ROM only.
    pub fn probe(list: &ArgumentList) -> Result<Self> {
        let binary = list.binary().ok_or(Error::PathNotSet("emulator binary"))?;
        let rom = list.rom().ok_or(Error::PathNotSet("ROM"))?;
        Ok(Self {
            binary: binary.to_string(),
            entries: Vec::new(),
            rom: rom.to_string(),
        })
    }

    /// Flat argv: binary, entries in order, ROM path.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.binary.as_str())
            .chain(self.entries.iter().flat_map(|entry| entry.tokens()))
            .chain(std::iter::once(self.rom.as_str()))
            .map(str::to_string)
            .collect()
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn rom(&self) -> &str {
        &self.rom
    }

    /// Current SRAM assignment, if the command carries one.
    pub fn sram_assignment(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            ArgEntry::Sram(assignment) => Some(assignment.as_str()),
            ArgEntry::Token(_) => None,
        })
    }

    /// Replace the ROM slot.
    pub(crate) fn set_rom(&mut self, rom: &str) {
        self.rom = rom.to_string();
    }

    /// Replace the SRAM slot in place, or add it just before the ROM if the
    /// command has none yet.
    pub(crate) fn set_sram(&mut self, assignment: String) {
        match self
            .entries
            .iter_mut()
            .find(|entry| matches!(entry, ArgEntry::Sram(_)))
        {
            Some(entry) => *entry = ArgEntry::Sram(assignment),
            None => self.entries.push(ArgEntry::Sram(assignment)),
        }
    }
}
