//! Small shell scripts standing in for engine executables (Unix only).

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};

// Writing an executable while another test forks can make exec fail with
// ETXTBSY; tests that write scripts hold this lock.
static SERIAL: Mutex<()> = Mutex::new(());

/// Serialise script-writing tests within one test binary.
pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write an executable `#!/bin/sh` script named `fake-engine` into `dir`.
pub fn fake_engine(dir: &Path, body: &str) -> io::Result<PathBuf> {
    let path = dir.join("fake-engine");
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    let mut perms = fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms)?;
    Ok(path)
}

/// Script line recording the script's own pid in `pid_file`.
pub fn record_pid(pid_file: &Path) -> String {
    format!("echo $$ > '{}'", pid_file.display())
}

/// Pid written by a script using [`record_pid`].
pub fn read_pid(pid_file: &Path) -> u32 {
    let text = fs::read_to_string(pid_file)
        .unwrap_or_else(|e| panic!("reading pid file {}: {e}", pid_file.display()));
    text.trim()
        .parse()
        .unwrap_or_else(|e| panic!("bad pid {text:?}: {e}"))
}

/// Whether a process with `pid` still exists (zombies included).
pub fn process_exists(pid: u32) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("kill -0 {pid}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
