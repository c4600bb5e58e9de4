//! Last emulator-reported error and warning

use crate::text::BoundedText;

/// Usable bytes in the error and warning messages.
pub const MESSAGE_CAPACITY: usize = 255;

pub type Message = BoundedText<MESSAGE_CAPACITY>;

/// Error flag and messages from the most recent probe.
///
/// Survives stop/start so the caller can inspect why the emulator refused
/// to start after the process is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    error_occurred: bool,
    error_message: Message,
    warning: Option<Message>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last probe ended on a fatal emulator error.
    pub fn error_occurred(&self) -> bool {
        self.error_occurred
    }

    /// Message of the last fatal emulator error (empty if none).
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Last non-fatal warning, if the most recent probe printed one.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Forget the previous probe's results. Called at the start of every probe.
    pub(crate) fn begin_probe(&mut self) {
        self.error_occurred = false;
        self.error_message.clear();
        self.warning = None;
    }

    pub(crate) fn record_error(&mut self, message: &str) {
        self.error_occurred = true;
        self.error_message.set(message);
    }

    pub(crate) fn record_warning(&mut self, message: &str) {
        self.warning = Some(Message::from_truncated(message));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
