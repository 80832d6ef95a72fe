use crate::instance_guard::{InstanceGuard, ProcessProbe};
use crate::AppError;

use std::fs;

/// Probe returning a fixed answer for every pid.
struct FixedProbe(Option<String>);

impl ProcessProbe for FixedProbe {
    fn process_name(&self, _pid: u32) -> Option<String> {
        self.0.clone()
    }
}

#[allow(clippy::unwrap_used)]
fn own_process_name() -> String {
    std::env::current_exe()
        .unwrap()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap()
}

/// WHAT: Acquiring with no existing lock writes our pid and drop removes it
/// WHY: The lock file lifecycle is the whole single-instance mechanism
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_lock_file_when_acquired_then_pid_written_and_removed_on_drop() {
    // Given: An empty temp directory
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("push-scribe.pid");

    // When: Acquiring the lock
    let guard = InstanceGuard::acquire_at(path.clone(), &FixedProbe(None)).unwrap();

    // Then: The file names this process
    assert_eq!(guard.path(), path);
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());

    // And: Dropping the guard removes the file
    drop(guard);
    assert!(!path.exists());
}

/// WHAT: A lock naming a dead pid is reclaimed silently
/// WHY: A crash leaves a stale file behind; the next launch must recover
/// without manual cleanup
#[test]
#[allow(clippy::unwrap_used)]
fn given_dead_owner_when_acquired_then_stale_lock_reclaimed() {
    // Given: A lock file whose owner no longer runs
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("push-scribe.pid");
    fs::write(&path, "999999").unwrap();

    // When: Acquiring with a probe that sees no such process
    let guard = InstanceGuard::acquire_at(path.clone(), &FixedProbe(None)).unwrap();

    // Then: The lock now names us
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
    drop(guard);
}

/// WHAT: A pid recycled by an unrelated program counts as stale
/// WHY: Pid liveness alone is not ownership; executable identity must match
#[test]
#[allow(clippy::unwrap_used)]
fn given_recycled_pid_when_acquired_then_lock_reclaimed() {
    // Given: A lock whose pid now belongs to a different program
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("push-scribe.pid");
    fs::write(&path, "4242").unwrap();

    // When: Acquiring with a probe that names another executable
    let probe = FixedProbe(Some("definitely-not-us".to_string()));
    let guard = InstanceGuard::acquire_at(path.clone(), &probe);

    // Then: The stale lock was reclaimed
    assert!(guard.is_ok());
}

/// WHAT: A live matching owner refuses acquisition with AlreadyRunning
/// WHY: Two instances would fight over hotkeys and the audio artifact
#[test]
#[allow(clippy::unwrap_used)]
fn given_live_matching_owner_when_acquired_then_already_running() {
    // Given: A lock owned by a live process with our executable name
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("push-scribe.pid");
    fs::write(&path, "4242").unwrap();

    // When: Acquiring with a probe that confirms the owner identity
    let probe = FixedProbe(Some(own_process_name()));
    let result = InstanceGuard::acquire_at(path.clone(), &probe);

    // Then: Acquisition is refused, naming the owner, and the lock is intact
    assert!(matches!(
        result,
        Err(AppError::AlreadyRunning { pid: 4242, .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap().trim(), "4242");
}

/// WHAT: A corrupt lock file is treated as stale
/// WHY: Garbage on disk must never wedge startup
#[test]
#[allow(clippy::unwrap_used)]
fn given_corrupt_lock_file_when_acquired_then_reclaimed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("push-scribe.pid");
    fs::write(&path, "not a pid").unwrap();

    let guard = InstanceGuard::acquire_at(path.clone(), &FixedProbe(None)).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents.trim(), std::process::id().to_string());
    drop(guard);
}
