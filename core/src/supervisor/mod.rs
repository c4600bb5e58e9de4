//! Emulator process supervisor
//!
//! Owns one mupen64plus child at a time and walks it through
//! `Uninitialized -> Committed -> Running -> Stopped`:
//!
//! - `commit` probes the ROM once (binary + ROM only) so the ROM identifier
//!   is known before the real command line is finalized
//! - `start` spawns the committed command on a fresh PTY and scrapes its
//!   startup banter for ROM metadata or a fatal error
//! - `stop` kills the whole process group; `wait` reaps a child that exits
//!   on its own
//!
//! Every mutating operation takes `&mut self`, so a supervisor can never be
//! driven from two places at once.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::args::{ArgEntry, ArgumentList, CONFIG_DIR_FLAG, sram_assignment};
use crate::command::CommittedCommand;
use crate::config::SupervisorConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::fs::ensure_directory;
use crate::process::{
    ConsoleOutput, ExitReason, KillOutcome, ProcessBackend, PtyBackend, SpawnedProcess,
};
use crate::rom_info::RomInfo;
use crate::save::{self, SaveContext, SaveDirResolver, SaveKind, TimeTrialSaveDirs};
use crate::scraper::{self, ProbeReport};


/// Lifecycle state derived from what the supervisor currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No committed command
    Uninitialized,
    /// Committed, never started
    Committed,
    /// A child process is alive (or not yet reaped)
    Running,
    /// Committed and started at least once, no child now
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Committed => "committed",
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

struct ProcessHandle {
    pid: u32,
    output: ConsoleOutput,
}

/// Supervisor for one emulator process.
pub struct EmulatorSupervisor<B: ProcessBackend = PtyBackend> {
    config: SupervisorConfig,
    backend: B,
    save_dirs: Box<dyn SaveDirResolver>,
    args: ArgumentList,
    command: Option<CommittedCommand>,
    process: Option<ProcessHandle>,
    has_run: bool,
    save_context: Option<SaveContext>,
    rom_info: RomInfo,
    diagnostics: Diagnostics,
    last_exit: Option<ExitReason>,
}

impl EmulatorSupervisor<PtyBackend> {
    /// Supervisor using the real PTY backend and the time-trial save layout.
    pub fn new(config: SupervisorConfig) -> Self {
        let backend = PtyBackend::with_read_timeout(config.read_timeout);
        Self::with_backend(config, backend, Box::new(TimeTrialSaveDirs::new()))
    }
}

impl<B: ProcessBackend> EmulatorSupervisor<B> {
    pub fn with_backend(
        config: SupervisorConfig,
        backend: B,
        save_dirs: Box<dyn SaveDirResolver>,
    ) -> Self {
        Self {
            config,
            backend,
            save_dirs,
            args: ArgumentList::new(),
            command: None,
            process: None,
            has_run: false,
            save_context: None,
            rom_info: RomInfo::default(),
            diagnostics: Diagnostics::new(),
            last_exit: None,
        }
    }

    // ========================================================================
    // Argument list
    // ========================================================================

    pub fn set_binary(&mut self, path: &str) -> Result<()> {
        self.args.set_binary(path)?;
        debug!("Emulator binary set to {}", path);
        Ok(())
    }

    /// Set the ROM path. After a commit this also replaces the committed
    /// ROM slot, so the next `start` runs the new ROM without recommitting.
    ///
    /// A per-ROM save path goes back to pending; `start` re-probes and
    /// points it at the new ROM's directory.
    pub fn set_rom(&mut self, path: &str) -> Result<()> {
        self.args.set_rom(path)?;
        if let Some(command) = self.command.as_mut() {
            command.set_rom(path);
            if let Some(context) = self
                .save_context
                .as_mut()
                .filter(|context| context.kind.is_per_rom())
            {
                context.save_path = None;
            }
        }
        info!("ROM set to {}", path);
        Ok(())
    }

    /// Append a caller argument. Arguments added after a commit only take
    /// effect after `cleanup` and a new commit.
    pub fn add_argument(&mut self, token: &str) -> Result<()> {
        self.args.add_argument(token)?;
        if self.command.is_some() {
            debug!("Argument \"{}\" queued for the next commit", token);
        }
        Ok(())
    }

    pub fn is_argument_set(&self, needle: &str) -> bool {
        self.args.is_argument_set(needle)
    }

    pub fn arguments(&self) -> &ArgumentList {
        &self.args
    }

    // ========================================================================
    // Save context
    // ========================================================================

    /// Point the emulator's SRAM at the directory for `category` and `kind`.
    ///
    /// On failure the argument list and any earlier save context are left
    /// as they were.
    pub fn apply(&mut self, category: &str, kind: SaveKind) -> Result<()> {
        let resolved_dir = self.save_dirs.resolve_path(category, kind)?;
        if kind.is_per_rom() {
            let dir = self.config.save_base_dir().join(&resolved_dir);
            ensure_directory(&dir, self.config.dir_mode)?;
        }
        let mut context = SaveContext::new(category, kind, resolved_dir);

        if self.rom_info.is_populated() {
            self.resolve_save_path(&mut context)?;
        } else {
            debug!(
                "Save context {}/{} waits for the ROM identifier",
                kind, category
            );
        }

        self.save_context = Some(context);
        Ok(())
    }

    pub fn save_context(&self) -> Option<&SaveContext> {
        self.save_context.as_ref()
    }

    pub fn save_dirs(&self) -> &dyn SaveDirResolver {
        self.save_dirs.as_ref()
    }

    fn resolve_save_path(&mut self, context: &mut SaveContext) -> Result<()> {
        let path = save::save_path(
            &self.config.save_base_dir(),
            &context.resolved_dir,
            context.kind,
            &self.rom_info.id,
        );
        if context.kind.is_per_rom() {
            ensure_directory(&path, self.config.dir_mode)?;
        }

        let assignment = sram_assignment(&path.to_string_lossy());
        match self.command.as_mut() {
            Some(command) => command.set_sram(assignment),
            None => self.args.queue_sram(assignment),
        }
        info!("Save path set to {}", path.display());
        context.save_path = Some(path);
        Ok(())
    }

    /// Recompute the applied context's save path from the current ROM id.
    fn refresh_save_context(&mut self) -> Result<()> {
        let Some(mut context) = self.save_context.take() else {
            return Ok(());
        };
        let resolved = self.resolve_save_path(&mut context);
        self.save_context = Some(context);
        resolved
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Probe the ROM and freeze the command line. No-op once committed.
    ///
    /// Any failure leaves the supervisor uncommitted.
    pub fn commit(&mut self) -> Result<()> {
        if self.command.is_some() {
            debug!("Emulator command already committed");
            return Ok(());
        }
        CommittedCommand::probe(&self.args)?;

        let config_dir = self.config.mupen_config_dir();
        ensure_directory(&config_dir, self.config.dir_mode)?;
        let mut extra = Vec::new();
        if !self.args.is_argument_set(CONFIG_DIR_FLAG) {
            extra.push(ArgEntry::Token(CONFIG_DIR_FLAG.to_string()));
            extra.push(ArgEntry::Token(config_dir.to_string_lossy().into_owned()));
        }

        self.probe()?;

        // The probe may have changed the ROM identifier under an applied
        // context, so per-ROM paths are recomputed here.
        self.refresh_save_context()?;

        let command = CommittedCommand::build(&self.args, extra)?;
        debug!("Committed command: {}", command.argv().join(" "));
        self.command = Some(command);
        self.has_run = false;
        info!("Emulator command committed");
        Ok(())
    }

    /// Run the emulator with only the binary and ROM to learn the ROM
    /// metadata, then stop it. Stops a running emulator first.
    pub fn probe(&mut self) -> Result<()> {
        let command = CommittedCommand::probe(&self.args)?;
        self.stop()?;

        info!("Probing ROM {}", command.rom());
        self.spawn(&command)?;
        let scraped = self.scrape_output();
        let stopped = self.stop();
        scraped?;
        stopped
    }

    /// Launch the committed command and return once the emulator has
    /// either reported the ROM metadata or a fatal error.
    ///
    /// A save path left pending by `set_rom` is resolved first with a probe
    /// of the new ROM.
    pub fn start(&mut self) -> Result<()> {
        if self.command.is_none() {
            return Err(Error::NotCommitted);
        }
        if self.save_context.as_ref().is_some_and(SaveContext::is_pending) {
            self.probe()?;
            self.refresh_save_context()?;
        }
        let command = self.command.clone().ok_or(Error::NotCommitted)?;
        self.stop()?;

        info!("Starting emulator...");
        self.spawn(&command)?;
        self.has_run = true;

        if let Err(e) = self.scrape_output() {
            if let Err(stop_err) = self.stop() {
                warn!("Failed to stop emulator after failed start: {}", stop_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Block until the emulator exits. No-op when nothing is running.
    pub fn wait(&mut self) -> Result<()> {
        let Some(ProcessHandle { pid, mut output }) = self.process.take() else {
            return Ok(());
        };
        // Keep reading until the emulator closes its terminal; an undrained
        // PTY blocks the emulator once its buffer fills.
        let drained = scraper::drain_console(&mut output);
        debug!("Read {} bytes of emulator output before exit", drained);
        drop(output);

        match self.backend.wait(pid) {
            Ok(reason) => {
                info!("Emulator process {} {}", pid, reason);
                self.last_exit = Some(reason);
                Ok(())
            }
            Err(source) => {
                error!("Failed to wait for emulator process {}: {}", pid, source);
                Err(Error::Wait { pid, source })
            }
        }
    }

    /// Kill the emulator's process group and reap it. No-op when nothing is
    /// running.
    pub fn stop(&mut self) -> Result<()> {
        let Some(pid) = self.pid() else {
            return Ok(());
        };

        debug!("Stopping emulator process {}", pid);
        match self.backend.kill_group(pid) {
            Ok(KillOutcome::Delivered) => self.wait(),
            Ok(KillOutcome::AlreadyGone) => {
                debug!("Emulator process {} already gone", pid);
                if let Err(e) = self.wait() {
                    debug!("Reaping vanished emulator process failed: {}", e);
                }
                Ok(())
            }
            Err(source) => {
                self.process = None;
                error!("Failed to kill emulator process {}: {}", pid, source);
                Err(Error::Kill { pid, source })
            }
        }
    }

    /// Stop the emulator and forget everything: arguments, committed
    /// command, save context, ROM info and diagnostics.
    pub fn cleanup(&mut self) -> Result<()> {
        info!("Cleaning up emulator supervisor");
        let stopped = self.stop();
        self.process = None;
        self.args.clear();
        self.command = None;
        self.has_run = false;
        self.save_context = None;
        self.rom_info.clear();
        self.diagnostics.clear();
        self.last_exit = None;
        stopped
    }

    pub fn running(&self) -> bool {
        self.process.is_some()
    }

    pub fn state(&self) -> LifecycleState {
        if self.process.is_some() {
            LifecycleState::Running
        } else if self.command.is_none() {
            LifecycleState::Uninitialized
        } else if self.has_run {
            LifecycleState::Stopped
        } else {
            LifecycleState::Committed
        }
    }

    /// Process id of the running emulator.
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(|handle| handle.pid)
    }

    pub fn command(&self) -> Option<&CommittedCommand> {
        self.command.as_ref()
    }

    /// How the last reaped emulator process ended.
    pub fn last_exit(&self) -> Option<&ExitReason> {
        self.last_exit.as_ref()
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ========================================================================
    // ROM info and diagnostics
    // ========================================================================

    pub fn rom_info(&self) -> &RomInfo {
        &self.rom_info
    }

    pub fn rom_goodname(&self) -> &str {
        &self.rom_info.goodname
    }

    pub fn rom_md5(&self) -> &str {
        &self.rom_info.md5
    }

    pub fn rom_country(&self) -> &str {
        &self.rom_info.country
    }

    pub fn rom_imagetype(&self) -> &str {
        &self.rom_info.imagetype
    }

    /// `<goodname>-<first 8 characters of the MD5>`
    pub fn rom_id(&self) -> &str {
        &self.rom_info.id
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn error_occurred(&self) -> bool {
        self.diagnostics.error_occurred()
    }

    pub fn error_message(&self) -> &str {
        self.diagnostics.error_message()
    }

    pub fn warning(&self) -> Option<&str> {
        self.diagnostics.warning()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn spawn(&mut self, command: &CommittedCommand) -> Result<()> {
        let argv = command.argv();
        debug!("Spawning: {}", argv.join(" "));

        let SpawnedProcess { pid, output } =
            self.backend.spawn(&argv).map_err(|source| Error::Spawn {
                program: command.binary().to_string(),
                source,
            })?;
        info!("Emulator process {} started", pid);
        self.process = Some(ProcessHandle { pid, output });
        Ok(())
    }

    fn scrape_output(&mut self) -> Result<()> {
        self.diagnostics.begin_probe();
        let Some(handle) = self.process.as_mut() else {
            return Ok(());
        };

        match scraper::scrape(&mut handle.output, self.config.read_timeout)? {
            ProbeReport::Failed { error } => {
                error!("Emulator: {}", error);
                self.diagnostics.record_error(&error);
                Err(Error::Emulator(self.diagnostics.error_message().to_string()))
            }
            ProbeReport::Started {
                rom_info,
                warning,
                missing,
            } => {
                if let Some(warning) = warning {
                    warn!("Emulator: {}", warning);
                    self.diagnostics.record_warning(&warning);
                }
                for key in missing {
                    warn!("No \"{}\" in emulator output", key);
                }
                info!("ROM: {} ({})", rom_info.goodname, rom_info.md5);
                self.rom_info = rom_info;
                Ok(())
            }
        }
    }
}

impl<B: ProcessBackend> Drop for EmulatorSupervisor<B> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop emulator on drop: {}", e);
        }
    }
}

impl<B: ProcessBackend> fmt::Debug for EmulatorSupervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmulatorSupervisor")
            .field("state", &self.state())
            .field("pid", &self.pid())
            .field("command", &self.command)
            .field("rom_id", &self.rom_id())
            .finish_non_exhaustive()
    }
}
