//! Emulator argument list
//!
//! Collects the binary path, ROM path and extra command-line tokens before
//! they are committed into a [`CommittedCommand`](crate::CommittedCommand).

use crate::error::{Error, Result};

/// Config key the emulator reads its SRAM save directory from.
///
/// Only a save context may set it; [`ArgumentList::add_argument`] rejects
/// any token containing it.
pub const SRAM_KEY: &str = "Core[SaveSRAMPath]";

/// Flag preceding every `Section[Key]=value` config override.
pub const SET_FLAG: &str = "--set";

/// Flag pointing the emulator at its config directory.
pub const CONFIG_DIR_FLAG: &str = "--configdir";

/// One entry between the binary and the ROM path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgEntry {
    /// A caller-supplied token, passed through verbatim
    Token(String),
    /// The SRAM assignment (`Core[SaveSRAMPath]=<dir>`), preceded by `--set`
    Sram(String),
}

impl ArgEntry {
    /// Tokens this entry contributes to the argv.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        let (first, second) = match self {
            ArgEntry::Token(token) => (None, token.as_str()),
            ArgEntry::Sram(assignment) => (Some(SET_FLAG), assignment.as_str()),
        };
        first.into_iter().chain(std::iter::once(second))
    }
}

/// Build the SRAM assignment token for a save directory.
pub fn sram_assignment(save_path: &str) -> String {
    format!("{}={}", SRAM_KEY, save_path)
}

/// Ordered emulator command line as built by the caller.
///
/// Every setter stores its own copy of the input, so callers may drop or
/// reuse their strings afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    binary: Option<String>,
    rom: Option<String>,
    entries: Vec<ArgEntry>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a caller token.
    ///
    /// Fails if `token` contains [`SRAM_KEY`]; the list is left unchanged.
    pub fn add_argument(&mut self, token: &str) -> Result<()> {
        if token.contains(SRAM_KEY) {
            tracing::warn!("Rejected argument \"{}\": {} is reserved", token, SRAM_KEY);
            return Err(Error::ReservedArgument(SRAM_KEY));
        }
        self.entries.push(ArgEntry::Token(token.to_string()));
        Ok(())
    }

    /// Returns `true` if any stored token contains `needle`.
    pub fn is_argument_set(&self, needle: &str) -> bool {
        self.entries
            .iter()
            .flat_map(|entry| entry.tokens())
            .any(|token| token.contains(needle))
    }

    /// Replace the emulator binary path.
    pub fn set_binary(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::EmptyPath("emulator binary"));
        }
        self.binary = Some(path.to_string());
        Ok(())
    }

    /// Replace the ROM path.
    pub fn set_rom(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::EmptyPath("ROM"));
        }
        self.rom = Some(path.to_string());
        Ok(())
    }

    pub fn binary(&self) -> Option<&str> {
        self.binary.as_deref()
    }

    pub fn rom(&self) -> Option<&str> {
        self.rom.as_deref()
    }

    /// Number of entries between binary and ROM.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ArgEntry] {
        &self.entries
    }

    /// Queue the SRAM assignment, replacing a previously queued one in place.
    pub(crate) fn queue_sram(&mut self, assignment: String) {
        match self
            .entries
            .iter_mut()
            .find(|entry| matches!(entry, ArgEntry::Sram(_)))
        {
            Some(entry) => *entry = ArgEntry::Sram(assignment),
            None => self.entries.push(ArgEntry::Sram(assignment)),
        }
    }

    /// Release every token and both paths. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.binary = None;
        self.rom = None;
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_argument_preserves_order() {
        let mut args = ArgumentList::new();
        args.add_argument("--nospeedlimit").unwrap();
        args.add_argument("--resolution").unwrap();
        args.add_argument("640x480").unwrap();

        let tokens: Vec<&str> = args
            .entries()
            .iter()
            .flat_map(|entry| entry.tokens())
            .collect();
        assert_eq!(tokens, ["--nospeedlimit", "--resolution", "640x480"]);
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_reserved_sram_key_rejected() {
        let mut args = ArgumentList::new();
        args.add_argument("--fullscreen").unwrap();

        let err = args
            .add_argument("Core[SaveSRAMPath]=/tmp/elsewhere")
            .unwrap_err();
        assert!(matches!(err, Error::ReservedArgument(_)));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_is_argument_set_matches_substring() {
        let mut args = ArgumentList::new();
        args.add_argument("--configdir").unwrap();
        args.add_argument("/home/racer/cfg").unwrap();

        assert!(args.is_argument_set("--configdir"));
        assert!(args.is_argument_set("racer"));
        assert!(!args.is_argument_set("--fullscreen"));
    }

    #[test]
    fn test_empty_paths_rejected() {
        let mut args = ArgumentList::new();
        assert!(matches!(args.set_binary(""), Err(Error::EmptyPath(_))));
        assert!(matches!(args.set_rom(""), Err(Error::EmptyPath(_))));
        assert_eq!(args.binary(), None);
        assert_eq!(args.rom(), None);
    }

    #[test]
    fn test_setters_replace_previous_value() {
        let mut args = ArgumentList::new();
        args.set_rom("/roms/a.z64").unwrap();
        args.set_rom("/roms/b.z64").unwrap();
        assert_eq!(args.rom(), Some("/roms/b.z64"));
    }

    #[test]
    fn test_queue_sram_replaces_existing_entry() {
        let mut args = ArgumentList::new();
        args.add_argument("--fullscreen").unwrap();
        args.queue_sram(sram_assignment("/saves/one"));
        args.add_argument("--windowed").unwrap();
        args.queue_sram(sram_assignment("/saves/two"));

        assert_eq!(args.len(), 3);
        assert_eq!(
            args.entries()[1],
            ArgEntry::Sram("Core[SaveSRAMPath]=/saves/two".to_string())
        );
        assert!(args.is_argument_set(SRAM_KEY));
    }

    #[test]
    fn test_sram_entry_renders_with_set_flag() {
        let entry = ArgEntry::Sram(sram_assignment("/s"));
        let tokens: Vec<&str> = entry.tokens().collect();
        assert_eq!(tokens, ["--set", "Core[SaveSRAMPath]=/s"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut args = ArgumentList::new();
        args.set_binary("mupen64plus").unwrap();
        args.add_argument("--fullscreen").unwrap();

        args.clear();
        args.clear();
        assert!(args.is_empty());
        assert_eq!(args.binary(), None);
    }
}
