//! Status toasts, driven only from the UI thread.
//!
//! The controller emits [`ToastCommand`]s through the event-loop proxy;
//! the FIFO user-event queue preserves per-session emission order. Each
//! visible toast is an OS notification; `HideAfter` hands the event loop
//! a deadline so the auto-hide is a scheduled callback on the loop itself
//! rather than a timer thread.

use crate::ToastCommand;

use std::time::Instant;

use notify_rust::{Notification, Timeout};
use tracing::{debug, warn};

/// Fallback expiry for a toast the controller never hides explicitly.
const TOAST_TIMEOUT_MS: u32 = 4_000;

/// Renders toast commands; owns the notion of "the current toast".
pub struct Toaster {
    current_text: Option<String>,
}

impl Toaster {
    /// Create an idle toaster.
    pub fn new() -> Self {
        Self { current_text: None }
    }

    /// Process one command. Returns the deadline at which the event loop
    /// should call [`Toaster::expire`], if the command scheduled one.
    pub fn handle(&mut self, cmd: ToastCommand) -> Option<Instant> {
        match cmd {
            ToastCommand::Show(text) => {
                self.display(&text);
                self.current_text = Some(text);
                None
            }
            ToastCommand::Update(text) => {
                if self.current_text.is_none() {
                    debug!("Update with no visible toast, showing fresh");
                }
                self.display(&text);
                self.current_text = Some(text);
                None
            }
            ToastCommand::HideAfter(delay) => {
                self.current_text.as_ref()?;
                Some(Instant::now() + delay)
            }
        }
    }

    /// Called by the event loop when a `HideAfter` deadline is reached.
    pub fn expire(&mut self) {
        if self.current_text.take().is_some() {
            debug!("Toast expired");
        }
    }

    fn display(&self, text: &str) {
        // OS notifications carry their own expiry as a safety net; the
        // scheduled expire() is what implements the controller's delay.
        if let Err(e) = Notification::new()
            .summary("Push-Scribe")
            .body(text)
            .timeout(Timeout::Milliseconds(TOAST_TIMEOUT_MS))
            .show()
        {
            warn!(error = %e, "Failed to display toast");
        }
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}
