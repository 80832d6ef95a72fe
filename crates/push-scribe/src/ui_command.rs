use crate::{TrayIconState, config::Settings};

use std::time::Duration;

/// Transient status text shown to the user.
///
/// Produced by the controller, consumed strictly in emission order by the
/// UI thread. Commands never interleave across sessions because only one
/// session exists at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastCommand {
    /// Show a new toast with the given text.
    Show(String),
    /// Replace the text of the current toast.
    Update(String),
    /// Hide the current toast after the given delay.
    HideAfter(Duration),
}

/// Commands marshalled from any thread onto the main UI thread.
///
/// The main thread owns the tray icon, the toaster, and the hotkey
/// manager (all are `!Send` or require the message pump), so every
/// mutation of them flows through this enum via the event-loop proxy.
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Drive the status toaster.
    Toast(ToastCommand),
    /// Update the tray icon to a new state.
    SetTray(TrayIconState),
    /// Unbind all hotkeys, then bind the combos from the new settings,
    /// and re-theme the tray. The order guarantees no window where old
    /// and new combos are both registered.
    Rebind(Settings),
    /// Shut down: release resources on the main thread and exit 0.
    Shutdown,
}
