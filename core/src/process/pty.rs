//! Pseudo-terminal process backend
//!
//! mupen64plus only prints its startup banter line by line when stdout is a
//! terminal, so the emulator gets the slave side of a fresh PTY as stdin,
//! stdout and stderr. It starts a new session, which detaches it from the
//! launcher's terminal and makes it leader of its own process group, so a
//! single `killpg` takes down anything it forked.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::Duration;

use nix::errno::Errno;
use nix::fcntl::{FcntlArg, FdFlag, fcntl};
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::pty::{OpenptyResult, openpty};
use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{Pid, setsid};

use super::{ExitReason, KillOutcome, ProcessBackend, SpawnedProcess};

/// Real backend: `openpty` + `std::process::Command` + `killpg` + `waitpid`.
#[derive(Debug, Clone, Default)]
pub struct PtyBackend {
    read_timeout: Option<Duration>,
}

impl PtyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose console reads fail with `TimedOut` after `timeout`
    /// without output.
    pub fn with_read_timeout(timeout: Option<Duration>) -> Self {
        Self {
            read_timeout: timeout,
        }
    }
}

impl ProcessBackend for PtyBackend {
    fn spawn(&mut self, argv: &[String]) -> io::Result<SpawnedProcess> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;

        let OpenptyResult { master, slave } = openpty(None, None)?;
        set_cloexec(&master)?;
        set_cloexec(&slave)?;

        // The command owns the parent's copies of the slave; dropping it at
        // the end of this block leaves the child as the only holder, so the
        // master sees EOF once the child exits.
        let child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::from(slave.try_clone()?))
                .stdout(Stdio::from(slave.try_clone()?))
                .stderr(Stdio::from(slave));
            // SAFETY: setsid is async-signal-safe and only touches the child.
            unsafe {
                command.pre_exec(|| {
                    setsid()?;
                    Ok(())
                });
            }
            command.spawn()?
        };

        Ok(SpawnedProcess {
            pid: child.id(),
            output: Box::new(PtyOutput {
                master: File::from(master),
                timeout: self.read_timeout,
            }),
        })
    }

    fn kill_group(&mut self, pid: u32) -> io::Result<KillOutcome> {
        match killpg(to_pid(pid)?, Signal::SIGKILL) {
            Ok(()) => Ok(KillOutcome::Delivered),
            Err(Errno::ESRCH) => Ok(KillOutcome::AlreadyGone),
            Err(e) => Err(e.into()),
        }
    }

    fn wait(&mut self, pid: u32) -> io::Result<ExitReason> {
        let pid = to_pid(pid)?;
        loop {
            match waitpid(pid, None) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(ExitReason::Exited(code)),
                Ok(WaitStatus::Signaled(_, signal, core_dumped)) => {
                    return Ok(ExitReason::Signaled {
                        signal: signal.as_str().to_string(),
                        core_dumped,
                    });
                }
                Ok(status) => tracing::debug!("Ignoring wait status {:?}", status),
                Err(Errno::EINTR) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Master side of the emulator's terminal.
#[derive(Debug)]
pub struct PtyOutput {
    master: File,
    timeout: Option<Duration>,
}

impl Read for PtyOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(timeout) = self.timeout {
            let poll_timeout = PollTimeout::try_from(timeout).unwrap_or(PollTimeout::MAX);
            let mut fds = [PollFd::new(self.master.as_fd(), PollFlags::POLLIN)];
            if poll(&mut fds, poll_timeout)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no emulator output before timeout",
                ));
            }
        }

        match self.master.read(buf) {
            // Linux reports a hung-up slave as EIO rather than EOF
            Err(e) if e.raw_os_error() == Some(Errno::EIO as i32) => Ok(0),
            other => other,
        }
    }
}

fn set_cloexec(fd: &OwnedFd) -> io::Result<()> {
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok(())
}

fn to_pid(pid: u32) -> io::Result<Pid> {
    i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))
}
