//! Capacity-bounded text storage
//!
//! Console fields scraped from the emulator are stored in fixed-capacity
//! strings. Appending past the capacity truncates on a character boundary
//! and reports it instead of overflowing.

use std::fmt;
use std::ops::Deref;

/// Owned string holding at most `CAP` bytes of UTF-8.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundedText<const CAP: usize> {
    inner: String,
}

impl<const CAP: usize> BoundedText<CAP> {
    /// Create an empty value.
    pub const fn new() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Build from `s`, truncated to capacity.
    pub fn from_truncated(s: &str) -> Self {
        let mut text = Self::new();
        text.push_str(s);
        text
    }

    /// Maximum number of bytes this value can hold.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Append as much of `s` as fits.
    ///
    /// Returns `true` if `s` had to be truncated.
    pub fn push_str(&mut self, s: &str) -> bool {
        let room = CAP - self.inner.len();
        if s.len() <= room {
            self.inner.push_str(s);
            return false;
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.inner.push_str(&s[..end]);
        true
    }

    /// Replace the contents with `s`, truncated to capacity.
    ///
    /// Returns `true` if `s` had to be truncated.
    pub fn set(&mut self, s: &str) -> bool {
        self.inner.clear();
        self.push_str(s)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl<const CAP: usize> Deref for BoundedText<CAP> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.inner
    }
}

impl<const CAP: usize> fmt::Display for BoundedText<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl<const CAP: usize> fmt::Debug for BoundedText<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut text = BoundedText::<8>::new();
        assert!(!text.push_str("abcd"));
        assert!(!text.push_str("efgh"));
        assert_eq!(text.as_str(), "abcdefgh");
    }

    #[test]
    fn test_push_truncates_and_reports() {
        let mut text = BoundedText::<5>::new();
        assert!(text.push_str("abcdefgh"));
        assert_eq!(text.as_str(), "abcde");
        assert!(text.push_str("x"));
        assert_eq!(text.len(), 5);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 'é' is two bytes; only one byte of room remains after "abcd"
        let text = BoundedText::<5>::from_truncated("abcdé");
        assert_eq!(text.as_str(), "abcd");
    }

    #[test]
    fn test_set_replaces_contents() {
        let mut text = BoundedText::<16>::from_truncated("old value");
        assert!(!text.set("new"));
        assert_eq!(text.as_str(), "new");
        text.clear();
        assert!(text.is_empty());
    }
}
