use crate::UiCommand;

use std::sync::Mutex;

use tao::event_loop::EventLoopProxy;
use tracing::error;

/// Enqueues commands for the UI thread; safe to call from any thread.
///
/// The production implementation wraps the tao event-loop proxy. Tests
/// substitute a recorder so the emitted command order can be asserted.
pub trait UiSink: Send + Sync {
    /// Enqueue one command. Delivery failures are logged, never escalated:
    /// losing a toast must not take a session down with it.
    fn send(&self, cmd: UiCommand);
}

/// Production sink backed by the tao event loop's user-event queue.
///
/// The queue is FIFO per sender, which is what gives toast commands their
/// per-session ordering guarantee.
pub struct EventLoopSink {
    proxy: Mutex<EventLoopProxy<UiCommand>>,
}

impl EventLoopSink {
    /// Wrap an event-loop proxy.
    pub fn new(proxy: EventLoopProxy<UiCommand>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
        }
    }
}

impl UiSink for EventLoopSink {
    fn send(&self, cmd: UiCommand) {
        let proxy = self.proxy.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = proxy.send_event(cmd) {
            // Only fails once the event loop is gone, i.e. during teardown.
            error!(error = %e, "UI command dropped, event loop closed");
        }
    }
}
