//! Forwards global hotkey events into the controller's command queue.
//!
//! Hotkey callbacks fire on an OS-managed context that must never block
//! or touch controller state. This forwarder drains the global-hotkey
//! crossbeam channel on a blocking task, translates each event through
//! the shared role registry, and only enqueues typed commands.

use crate::{AppCommand, AppError, AppResult, hotkey::HotkeyRole, hotkey::SharedRegistry};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, HotKeyState};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Hotkey event forwarder.
pub struct HotkeyForwarder {
    registry: SharedRegistry,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyForwarder {
    /// Create a forwarder that resolves events against `registry`.
    ///
    /// This struct is `Send` and can live on any thread — it only listens
    /// on the global [`GlobalHotKeyEvent`] channel.
    pub fn new(registry: SharedRegistry, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            registry,
            command_tx,
        }
    }

    /// Run the forwarder loop until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // The hotkey crate publishes events on a global crossbeam channel,
        // so a single long-lived blocking task bridges it onto the async
        // queue. It polls with a short timeout instead of parking in
        // recv(): dropping event_rx after the select loop ends is how the
        // bridge learns to exit.
        let handle = tokio::task::spawn_blocking(move || {
            loop {
                if let Ok(event) = receiver.recv_timeout(Duration::from_millis(100)) {
                    if event_tx.blocking_send(event).is_err() {
                        break;
                    }
                } else if event_tx.is_closed() {
                    break;
                }
            }
        });

        let mut queue_error = None;

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey forwarder shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if let Some(cmd) = self.translate(&event) {
                        if let Err(e) = self.command_tx.send(cmd).await {
                            // The controller never closes its queue before
                            // signalling shutdown, so this is abnormal.
                            warn!("Controller queue closed, stopping forwarder");
                            queue_error = Some(AppError::ChannelSendFailed {
                                message: format!("Controller queue closed: {}", e),
                                location: ErrorLocation::from(Location::caller()),
                            });
                            break;
                        }
                    }
                }
            }
        }

        drop(event_rx);

        // The bridge notices the dropped receiver within one poll tick.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event bridge stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event bridge task panicked"),
            Err(_) => debug!("Hotkey event bridge still busy at exit, leaving it to the OS"),
        }

        match queue_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Map a raw hotkey event to a controller command via the registry.
    fn translate(&self, event: &GlobalHotKeyEvent) -> Option<AppCommand> {
        let role = {
            let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            registry.role(event.id())?
        };

        match (role, event.state()) {
            (HotkeyRole::RecordHold, HotKeyState::Pressed) => Some(AppCommand::KeyDown),
            (HotkeyRole::RecordHold, HotKeyState::Released) => Some(AppCommand::KeyUp),
            (HotkeyRole::RecordStart, HotKeyState::Pressed) => Some(AppCommand::KeyDown),
            (HotkeyRole::RecordStop, HotKeyState::Pressed) => Some(AppCommand::KeyUp),
            (HotkeyRole::Exit, HotKeyState::Pressed) => Some(AppCommand::Shutdown),
            _ => {
                debug!(id = event.id(), state = ?event.state(), "Hotkey event ignored");
                None
            }
        }
    }
}
