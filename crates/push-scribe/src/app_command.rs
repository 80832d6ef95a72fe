use crate::AppResult;

use uuid::Uuid;

/// Events delivered into the controller's single-consumer queue.
///
/// Every external execution context (hotkey callback forwarder, spawned
/// transcription tasks, tray menu) only enqueues; the controller mutates
/// state one event at a time, which is what makes the transition table
/// safe without locking session fields.
#[derive(Debug)]
pub enum AppCommand {
    /// The push-to-talk key was pressed.
    KeyDown,
    /// The push-to-talk key was released.
    KeyUp,
    /// A spawned transcription task finished (success or failure).
    TranscriptionFinished {
        /// Session the result belongs to; stale ids are ignored.
        session_id: Uuid,
        /// Recognized text or the absorbed per-session error.
        result: AppResult<String>,
    },
    /// Re-read settings and credential, then rebind hotkeys atomically.
    ReloadSettings,
    /// Request application shutdown.
    Shutdown,
}
