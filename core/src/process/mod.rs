//! Process backend abstraction
//!
//! The supervisor never touches OS process APIs directly. It goes through a
//! [`ProcessBackend`], which spawns a command attached to a pseudo-terminal,
//! signals its process group, and reaps it. [`PtyBackend`] is the real
//! implementation; tests substitute a scripted one.

mod pty;

use std::fmt;
use std::io::{self, Read};

pub use pty::{PtyBackend, PtyOutput};

/// Console output stream of a spawned emulator.
pub type ConsoleOutput = Box<dyn Read + Send>;

/// A freshly spawned emulator process.
pub struct SpawnedProcess {
    /// Process id, which is also the id of its process group
    pub pid: u32,
    /// Master side of the process's terminal
    pub output: ConsoleOutput,
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// Outcome of signalling a process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// The signal was delivered
    Delivered,
    /// No such process group; the process is already gone
    AlreadyGone,
}

/// Why a reaped process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Normal exit with a status code
    Exited(i32),
    /// Terminated by a signal
    Signaled {
        /// Signal name, e.g. `SIGKILL`
        signal: String,
        core_dumped: bool,
    },
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Exited(code) => write!(f, "exited ({})", code),
            ExitReason::Signaled {
                signal,
                core_dumped,
            } => write!(
                f,
                "exited ({}{})",
                signal,
                if *core_dumped { ", core dumped" } else { "" }
            ),
        }
    }
}

/// OS capabilities the supervisor needs to run the emulator.
pub trait ProcessBackend {
    /// Spawn `argv[0]` with the rest of `argv` as arguments, attached to a
    /// new pseudo-terminal and leading a new process group.
    fn spawn(&mut self, argv: &[String]) -> io::Result<SpawnedProcess>;

    /// Send SIGKILL to the process group led by `pid`.
    fn kill_group(&mut self, pid: u32) -> io::Result<KillOutcome>;

    /// Block until `pid` exits or is killed, retrying on interrupt.
    fn wait(&mut self, pid: u32) -> io::Result<ExitReason>;
}

impl<B: ProcessBackend + ?Sized> ProcessBackend for Box<B> {
    fn spawn(&mut self, argv: &[String]) -> io::Result<SpawnedProcess> {
        (**self).spawn(argv)
    }

    fn kill_group(&mut self, pid: u32) -> io::Result<KillOutcome> {
        (**self).kill_group(pid)
    }

    fn wait(&mut self, pid: u32) -> io::Result<ExitReason> {
        (**self).wait(pid)
    }
}
