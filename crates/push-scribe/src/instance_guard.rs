//! Single-instance enforcement via a PID lock file.
//!
//! The lock file holds the decimal pid of the owning process. On startup
//! the file is read: if it names a live process whose executable identity
//! matches this application, startup is refused with `AlreadyRunning`.
//! Any other situation (dead pid, pid reused by a different program,
//! unreadable or corrupt file) is a stale lock: it is reclaimed silently
//! and logged, never requiring manual cleanup. A crash leaves a stale
//! file behind by design; the next launch reclaims it with this rule.

use crate::{AppError, AppResult};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, info, instrument, warn};

/// Lock file name under the system temp directory.
const LOCK_FILE_NAME: &str = "push-scribe.pid";

/// Looks up the executable name of a live process, `None` if not running.
///
/// Separated from the guard so tests can decide what is "running".
pub trait ProcessProbe {
    /// Executable name for `pid`, or `None` when no such process exists.
    fn process_name(&self, pid: u32) -> Option<String>;
}

/// Production probe backed by the OS process table.
pub struct SystemProbe;

impl ProcessProbe for SystemProbe {
    fn process_name(&self, pid: u32) -> Option<String> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
        system
            .process(Pid::from_u32(pid))
            .map(|p| p.name().to_string_lossy().into_owned())
    }
}

/// Ownership of the single-instance guarantee.
///
/// Dropping the guard removes the lock file (clean shutdown); failure to
/// remove is logged, not fatal.
pub struct InstanceGuard {
    path: PathBuf,
}

impl InstanceGuard {
    /// Acquire the lock at the default location.
    #[instrument(skip(probe))]
    pub fn acquire(probe: &dyn ProcessProbe) -> AppResult<Self> {
        Self::acquire_at(std::env::temp_dir().join(LOCK_FILE_NAME), probe)
    }

    /// Acquire the lock at an explicit path.
    #[track_caller]
    pub fn acquire_at(path: PathBuf, probe: &dyn ProcessProbe) -> AppResult<Self> {
        if let Some(owner_pid) = read_owner_pid(&path) {
            if is_same_application(owner_pid, probe) {
                return Err(AppError::AlreadyRunning {
                    pid: owner_pid,
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            // Stale: owner is gone or the pid was reused by another program.
            info!(stale_pid = owner_pid, "Reclaiming stale instance lock");
            if let Err(e) = fs::remove_file(&path) {
                warn!(error = %e, "Failed to remove stale lock file");
            }
        }

        fs::write(&path, std::process::id().to_string())?;
        info!(lock_path = ?path, pid = std::process::id(), "Instance lock acquired");

        Ok(Self { path })
    }

    /// Path of the lock file this guard owns.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(lock_path = ?self.path, "Instance lock released"),
            Err(e) => warn!(error = %e, "Failed to remove instance lock file"),
        }
    }
}

/// Parse the lock file's pid. Unreadable or corrupt contents count as no
/// owner (stale).
fn read_owner_pid(path: &Path) -> Option<u32> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(error = %e, "Lock file unreadable, treating as stale");
            return None;
        }
    };

    match contents.trim().parse::<u32>() {
        Ok(pid) => Some(pid),
        Err(_) => {
            warn!(contents = %contents.trim(), "Lock file corrupt, treating as stale");
            None
        }
    }
}

/// A pid owns the lock only while it is running AND its executable name
/// matches ours; a recycled pid running something else is stale.
fn is_same_application(pid: u32, probe: &dyn ProcessProbe) -> bool {
    let Some(owner_name) = probe.process_name(pid) else {
        debug!(pid, "Lock owner is not running");
        return false;
    };

    let ours = current_process_name();
    let matches = ours
        .as_deref()
        .is_some_and(|name| owner_name.eq_ignore_ascii_case(name));

    debug!(pid, owner = %owner_name, matches, "Lock owner identity checked");

    matches
}

fn current_process_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}
