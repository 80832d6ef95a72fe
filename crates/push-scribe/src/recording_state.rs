use std::time::Instant;

use uuid::Uuid;

/// One record/transcribe/inject lifecycle instance.
///
/// Exactly one session exists at a time, owned by the controller. The id
/// correlates log lines and guards against stale transcription results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Unique session id for log correlation and stale-result detection.
    pub id: Uuid,
    /// When the session was created (key-down).
    pub started_at: Instant,
}

impl Session {
    /// Create a fresh session stamped now.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Instant::now(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller state machine states.
///
/// `Recording` implies exactly one live capture worker; `Idle` implies no
/// live worker and no pending transcription dispatch. Key events arriving
/// in `Recording` or `Processing` that do not match the transition table
/// are ignored; that is the re-entrancy guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Not currently recording; no session exists.
    Idle,
    /// Capture worker live, session open.
    Recording {
        /// The single live session.
        session: Session,
    },
    /// Recording finished, transcription in flight.
    Processing {
        /// The single live session.
        session: Session,
    },
}
