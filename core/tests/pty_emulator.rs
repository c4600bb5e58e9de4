//! Drives the real PTY backend with shell scripts standing in for mupen64plus.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mk64t_core::{EmulatorSupervisor, Error, ExitReason, LifecycleState, SupervisorConfig};
use tempfile::TempDir;

/// Prints the basename of its last argument as the good name, then idles
/// like an emulator in its main loop.
const FAKE_EMULATOR: &str = r#"#!/bin/sh
for last; do :; done
printf 'Core: Goodname: %s\n' "$(basename "$last")"
printf 'Core: MD5: 0123456789ABCDEF0123456789ABCDEF\n'
printf 'Core: Imagetype: .z64 (native)\n'
printf 'Core: Country: USA\n'
printf 'UI-Console Status: Cheat codes disabled.\n'
exec sleep 30
"#;

const BROKEN_EMULATOR: &str = r#"#!/bin/sh
printf 'UI-Console Error: ROM not found\n'
exec sleep 30
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// Both scenarios share one test so no other test thread forks while a
// script is still open for writing.
#[test]
fn test_pty_lifecycle() {
    let home = TempDir::new().unwrap();
    let emulator = write_script(home.path(), "mupen64plus", FAKE_EMULATOR);
    let broken = write_script(home.path(), "mupen64plus-broken", BROKEN_EMULATOR);
    let rom_a = home.path().join("a.z64");
    let rom_b = home.path().join("b.z64");
    fs::write(&rom_a, b"rom a").unwrap();
    fs::write(&rom_b, b"rom b").unwrap();

    let config =
        SupervisorConfig::new(home.path()).with_read_timeout(Some(Duration::from_secs(10)));

    // Healthy emulator
    let mut supervisor = EmulatorSupervisor::new(config.clone());
    supervisor.set_binary(emulator.to_str().unwrap()).unwrap();
    supervisor.set_rom(rom_a.to_str().unwrap()).unwrap();

    supervisor.commit().unwrap();
    assert_eq!(supervisor.rom_goodname(), "a.z64");
    assert_eq!(supervisor.rom_id(), "a.z64-01234567");
    assert!(!supervisor.running());

    supervisor.start().unwrap();
    assert!(supervisor.running());
    assert_eq!(supervisor.rom_country(), "USA");

    supervisor.set_rom(rom_b.to_str().unwrap()).unwrap();
    supervisor.start().unwrap();
    assert_eq!(supervisor.rom_goodname(), "b.z64");

    supervisor.stop().unwrap();
    assert!(!supervisor.running());
    assert_eq!(supervisor.state(), LifecycleState::Stopped);
    assert!(matches!(
        supervisor.last_exit(),
        Some(ExitReason::Signaled { signal, .. }) if signal == "SIGKILL"
    ));
    supervisor.cleanup().unwrap();

    // Emulator that refuses the ROM
    let mut supervisor = EmulatorSupervisor::new(config);
    supervisor.set_binary(broken.to_str().unwrap()).unwrap();
    supervisor.set_rom(rom_a.to_str().unwrap()).unwrap();

    let err = supervisor.commit().unwrap_err();
    assert!(matches!(&err, Error::Emulator(msg) if msg == "ROM not found"));
    assert!(supervisor.error_occurred());
    assert_eq!(supervisor.error_message(), "ROM not found");
    assert!(!supervisor.running());
    assert_eq!(supervisor.state(), LifecycleState::Uninitialized);
}
