//! Shared test utilities for unit tests

use std::collections::VecDeque;
use std::io::{self, Cursor};

use crate::process::{ExitReason, KillOutcome, ProcessBackend, SpawnedProcess};

/// Console output of a healthy Mario Kart 64 start.
pub const MK64_BANTER: &str = "\
Core: Goodname: Mario Kart 64 (U) [!]\r\n\
Core: Name: MARIOKART64\r\n\
Core: MD5: 3A67D9986F54EB282924FCA4CD5F6DFF\r\n\
Core: Imagetype: .z64 (native)\r\n\
Core: Country: USA\r\n\
UI-Console Status: Cheat codes disabled.\r\n";

/// Scripted process backend.
///
/// Each spawn consumes the next queued console output (falling back to
/// `default_output`) and records the argv it was given.
pub struct FakeBackend {
    pub default_output: String,
    pub outputs: VecDeque<String>,
    /// Every argv passed to `spawn`, in order
    pub spawned: Vec<Vec<String>>,
    /// Every pid passed to `kill_group`
    pub killed: Vec<u32>,
    /// Every pid passed to `wait`
    pub waited: Vec<u32>,
    /// Fail the next spawn with this error kind
    pub spawn_error: Option<io::ErrorKind>,
    /// Fail kills with this error kind
    pub kill_error: Option<io::ErrorKind>,
    pub kill_outcome: KillOutcome,
    pub exit_reason: ExitReason,
    next_pid: u32,
}

impl FakeBackend {
    pub fn new(default_output: &str) -> Self {
        Self {
            default_output: default_output.to_string(),
            outputs: VecDeque::new(),
            spawned: Vec::new(),
            killed: Vec::new(),
            waited: Vec::new(),
            spawn_error: None,
            kill_error: None,
            kill_outcome: KillOutcome::Delivered,
            exit_reason: ExitReason::Signaled {
                signal: "SIGKILL".to_string(),
                core_dumped: false,
            },
            next_pid: 1000,
        }
    }

    /// Backend whose every spawn prints [`MK64_BANTER`].
    pub fn mk64() -> Self {
        Self::new(MK64_BANTER)
    }

    /// Queue console output for the next spawn.
    pub fn push_output(&mut self, output: &str) {
        self.outputs.push_back(output.to_string());
    }

    pub fn last_spawned(&self) -> Option<&[String]> {
        self.spawned.last().map(Vec::as_slice)
    }
}

impl ProcessBackend for FakeBackend {
    fn spawn(&mut self, argv: &[String]) -> io::Result<SpawnedProcess> {
        if let Some(kind) = self.spawn_error.take() {
            return Err(io::Error::from(kind));
        }
        self.spawned.push(argv.to_vec());
        let output = self
            .outputs
            .pop_front()
            .unwrap_or_else(|| self.default_output.clone());
        self.next_pid += 1;
        Ok(SpawnedProcess {
            pid: self.next_pid,
            output: Box::new(Cursor::new(output.into_bytes())),
        })
    }

    fn kill_group(&mut self, pid: u32) -> io::Result<KillOutcome> {
        self.killed.push(pid);
        match self.kill_error {
            Some(kind) => Err(io::Error::from(kind)),
            None => Ok(self.kill_outcome),
        }
    }

    fn wait(&mut self, pid: u32) -> io::Result<ExitReason> {
        self.waited.push(pid);
        Ok(self.exit_reason.clone())
    }
}
