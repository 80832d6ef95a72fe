//! Text injection into the active application.
//!
//! Transcribed text lands in the clipboard and is pasted into the focused
//! window by simulating the platform paste chord. Injection is
//! best-effort from the controller's point of view: failures are logged
//! against the session, never escalated.

use crate::{AppError, AppResult, PasteKeyGuard};

use std::panic::Location;
use std::time::Duration;

use arboard::Clipboard;
use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Delay between clipboard write and paste simulation.
///
/// Gives the OS clipboard manager time to process the write before the
/// paste chord fires; too short and the paste may get stale content.
/// 50ms is empirically reliable across Windows, macOS, and Linux.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Delay between key events in the paste simulation.
///
/// Some applications and input method editors need a small gap between
/// key events to register them correctly. 10ms is the minimum reliable
/// interval.
const KEY_EVENT_DELAY: Duration = Duration::from_millis(10);

/// Injection seam consumed by the controller; tests substitute a recorder.
#[async_trait]
pub trait TextInjector: Send {
    /// Deliver `text` into the active application.
    async fn inject(&mut self, text: &str) -> AppResult<()>;
}

/// Production injector: clipboard write plus simulated paste chord.
pub struct OutputHandler {
    pub(crate) clipboard: Clipboard,
}

impl OutputHandler {
    /// Create a new output handler.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to initialize clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("OutputHandler initialized");

        Ok(Self { clipboard })
    }

    #[instrument(skip(self))]
    async fn paste(&mut self) -> AppResult<()> {
        use enigo::Key;

        // Simulate the paste chord on spawn_blocking since enigo operations
        // are synchronous and involve small sleeps for key event timing.
        //
        // A new Enigo instance is created inside spawn_blocking because
        // Enigo is not Send and creating one is cheap. The guard releases
        // the modifier on drop if the chord fails partway.
        let paste_result = tokio::task::spawn_blocking(|| {
            let mut guard = PasteKeyGuard::hold()?;

            std::thread::sleep(KEY_EVENT_DELAY);
            guard.tap(Key::Unicode('v'))?;
            std::thread::sleep(KEY_EVENT_DELAY);

            guard.release()
        })
        .await
        .map_err(|e| AppError::AutoPasteFailed {
            reason: format!("Paste task panicked: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        paste_result?;

        debug!("Paste chord simulated");

        Ok(())
    }
}

#[async_trait]
impl TextInjector for OutputHandler {
    #[instrument(skip(self, text))]
    async fn inject(&mut self, text: &str) -> AppResult<()> {
        // Copy first so the text survives even if the paste chord fails.
        self.clipboard
            .set_text(text)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(text_len = text.len(), "Text copied to clipboard");

        // Allow the clipboard manager to process the write before pasting.
        tokio::time::sleep(CLIPBOARD_SETTLE_DELAY).await;

        if let Err(e) = self.paste().await {
            warn!(error = ?e, "Paste failed, but text is in clipboard");
            return Err(e);
        }

        info!(text_len = text.len(), "Text injected");

        Ok(())
    }
}
