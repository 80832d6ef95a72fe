//! The recording controller: the single owner of session state.
//!
//! Runs on the async runtime thread. Every external trigger (hotkey
//! forwarder, spawned transcription tasks, tray menu) arrives as a typed
//! event on one single-consumer queue and is processed one at a time,
//! which is what makes the transition table safe without locking any
//! session field. UI work (toasts, tray mutations) is emitted as ordered
//! [`UiCommand`]s because the tray icon and toaster live on the main
//! thread.

use crate::{
    AppCommand, AppResult, RecordingState, ToastCommand, TrayIconState, UiCommand,
    config::{self, Settings},
    output_handler::TextInjector,
    recording_state::Session,
    ui_sink::UiSink,
};

use std::{path::Path, path::PathBuf, sync::Arc, time::Duration};

use push_scribe_core::{CaptureBackend, GroqTranscriber, Transcriber, encode_wav};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;
use uuid::Uuid;

/// How long terminal toasts stay visible before auto-hide.
const TOAST_HIDE_DELAY: Duration = Duration::from_millis(1000);

/// Bound on how long shutdown waits for an in-flight transcription before
/// discarding its result.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const TOAST_LISTENING: &str = "Listening…";
const TOAST_TRANSCRIBING: &str = "Transcribing…";
const TOAST_DONE: &str = "Done";
const TOAST_ERROR: &str = "Error!";
const TOAST_TOO_SHORT: &str = "Recording too short";
const TOAST_NO_CREDENTIAL: &str = "No API key configured";
const TOAST_MIC_UNAVAILABLE: &str = "Microphone unavailable";

/// Main application state machine.
pub struct App {
    pub(crate) state: RecordingState,
    pub(crate) capture: Box<dyn CaptureBackend>,
    pub(crate) transcriber: Option<Arc<dyn Transcriber>>,
    pub(crate) injector: Arc<Mutex<dyn TextInjector>>,
    pub(crate) ui: Arc<dyn UiSink>,
    pub(crate) settings: Settings,
    pub(crate) artifact_path: PathBuf,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) reload_menu_id: tray_icon::menu::MenuId,
    pub(crate) exit_menu_id: tray_icon::menu::MenuId,
    pub(crate) inflight: Option<JoinHandle<()>>,
}

impl App {
    /// Run the controller event loop until shutdown.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Push-Scribe starting");

        // The tray menu reports clicks on a global crossbeam channel, so
        // one long-lived blocking task bridges it into the async world.
        // It polls with a short timeout instead of parking in recv():
        // once tray_event_rx is dropped below, the next idle tick sees
        // the closed queue and the loop exits.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            loop {
                if let Ok(event) = receiver.recv_timeout(Duration::from_millis(100)) {
                    if tray_event_tx.blocking_send(event).is_err() {
                        break;
                    }
                } else if tray_event_tx.is_closed() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    self.handle_tray_event(event).await;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::KeyDown => self.handle_key_down().await,
                        AppCommand::KeyUp => self.handle_key_up().await,
                        AppCommand::TranscriptionFinished { session_id, result } => {
                            self.handle_transcription_finished(session_id, result).await;
                        }
                        AppCommand::ReloadSettings => self.handle_reload().await,
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        // Best-effort cancel of an in-flight capture.
        if matches!(self.state, RecordingState::Recording { .. }) {
            if let Err(e) = self.capture.stop() {
                warn!(error = ?e, "Failed to stop capture during shutdown");
            }
        }

        // Bounded grace for an in-flight transcription; its result is
        // discarded either way since the loop no longer drains the queue.
        if let Some(handle) = self.inflight.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(_) => debug!("In-flight transcription finished during shutdown"),
                Err(_) => info!("Discarding in-flight transcription after grace period"),
            }
        }

        drop(tray_event_rx);

        // The bridge notices the dropped receiver within one poll tick,
        // so a one-second bound on the join is plenty.
        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event bridge stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event bridge task panicked"),
            Err(_) => info!("Tray event bridge still busy at exit, leaving it to the OS"),
        }

        let _ = self.shutdown_tx.send(true);
        self.ui.send(UiCommand::Shutdown);
        info!("Push-Scribe shut down successfully");

        Ok(())
    }

    /// `Idle + KeyDown` opens a session and starts capture. Any other
    /// state ignores the event: that is the re-entrancy guard against key
    /// repeat and chatter, and it spans the whole recording+processing
    /// window.
    #[instrument(skip(self))]
    async fn handle_key_down(&mut self) {
        match self.state {
            RecordingState::Idle => {
                let session = Session::new();

                match self.capture.start() {
                    Ok(()) => {
                        self.state = RecordingState::Recording { session };
                        self.toast(ToastCommand::Show(TOAST_LISTENING.to_string()));
                        self.ui.send(UiCommand::SetTray(TrayIconState::Recording));
                        info!(session_id = %session.id, "Recording started");
                    }
                    Err(e) => {
                        // Device unavailable: transient toast, session
                        // discarded, controller stays Idle.
                        error!(session_id = %session.id, error = ?e, "Failed to start capture");
                        self.toast(ToastCommand::Show(TOAST_MIC_UNAVAILABLE.to_string()));
                        self.toast(ToastCommand::HideAfter(TOAST_HIDE_DELAY));
                    }
                }
            }
            RecordingState::Recording { .. } | RecordingState::Processing { .. } => {
                debug!("Key-down ignored, session already active");
            }
        }
    }

    /// `Recording + KeyUp` stops capture and classifies the result: empty
    /// goes straight back to Idle as "too short" (never visits
    /// Processing, never calls the transcriber), a missing credential
    /// skips the call with its own notice, otherwise the session enters
    /// Processing and the blocking transcription is dispatched off-loop.
    #[instrument(skip(self))]
    async fn handle_key_up(&mut self) {
        let RecordingState::Recording { session } = self.state else {
            debug!("Key-up ignored, not recording");
            return;
        };

        let samples = match self.capture.stop() {
            Ok(samples) => samples,
            Err(e) => {
                error!(session_id = %session.id, error = ?e, "Failed to stop capture");
                self.finish_session(ToastCommand::Update(TOAST_ERROR.to_string()));
                return;
            }
        };

        info!(
            session_id = %session.id,
            duration_ms = session.started_at.elapsed().as_millis(),
            sample_count = samples.len(),
            "Recording stopped"
        );

        if samples.is_empty() {
            // Shorter than one device callback period.
            self.finish_session(ToastCommand::Update(TOAST_TOO_SHORT.to_string()));
            return;
        }

        let Some(transcriber) = self.transcriber.clone() else {
            warn!(session_id = %session.id, "No API key, skipping transcription");
            self.finish_session(ToastCommand::Update(TOAST_NO_CREDENTIAL.to_string()));
            return;
        };

        let wav = match encode_wav(&samples) {
            Ok(wav) => wav,
            Err(e) => {
                error!(session_id = %session.id, error = ?e, "Failed to encode WAV");
                self.finish_session(ToastCommand::Update(TOAST_ERROR.to_string()));
                return;
            }
        };

        self.state = RecordingState::Processing { session };
        self.toast(ToastCommand::Update(TOAST_TRANSCRIBING.to_string()));
        self.ui.send(UiCommand::SetTray(TrayIconState::Processing));

        let command_tx = self.command_tx.clone();
        let artifact_path = self.artifact_path.clone();
        let session_id = session.id;

        self.inflight = Some(tokio::spawn(async move {
            let result = run_transcription(&artifact_path, wav, transcriber).await;
            if command_tx
                .send(AppCommand::TranscriptionFinished { session_id, result })
                .await
                .is_err()
            {
                warn!(session_id = %session_id, "Controller queue closed, result dropped");
            }
        }));
    }

    /// Terminal transition for the session named by `session_id`. Stale
    /// results (wrong id, or no session in Processing) are logged and
    /// ignored so a late task can never corrupt a newer session.
    #[instrument(skip(self, result))]
    async fn handle_transcription_finished(
        &mut self,
        session_id: Uuid,
        result: AppResult<String>,
    ) {
        self.inflight = None;

        let state = std::mem::replace(&mut self.state, RecordingState::Idle);
        let RecordingState::Processing { session } = state else {
            warn!(session_id = %session_id, "Transcription result with no session in flight");
            self.state = state;
            return;
        };
        if session.id != session_id {
            warn!(
                session_id = %session_id,
                current = %session.id,
                "Stale transcription result ignored"
            );
            self.state = state;
            return;
        }

        match result {
            Ok(text) => {
                info!(
                    session_id = %session_id,
                    duration_ms = session.started_at.elapsed().as_millis(),
                    text_len = text.len(),
                    "Transcription complete"
                );

                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    // Injection is best-effort: the text is already on the
                    // clipboard if only the paste chord failed.
                    let mut injector = self.injector.lock().await;
                    if let Err(e) = injector.inject(trimmed).await {
                        warn!(session_id = %session_id, error = ?e, "Failed to inject text");
                    }
                }

                self.finish_session(ToastCommand::Update(TOAST_DONE.to_string()));
            }
            Err(e) => {
                // Absorbed at this boundary: surfaced as a toast, never
                // retried, never escalated to process termination.
                error!(session_id = %session_id, error = ?e, "Transcription failed");
                self.finish_session(ToastCommand::Update(TOAST_ERROR.to_string()));
            }
        }
    }

    /// Re-read settings and credential, then hand the UI thread the new
    /// settings for an atomic hotkey rebind. New values replace the old
    /// ones wholesale; nothing is mutated in place.
    #[instrument(skip(self))]
    async fn handle_reload(&mut self) {
        match Settings::load() {
            Ok(settings) => {
                if settings == self.settings {
                    debug!("Settings unchanged after reload, rebinding anyway");
                }
                info!("Settings reloaded");
                self.settings = settings.clone();
                self.ui.send(UiCommand::Rebind(settings));
            }
            Err(e) => {
                error!(error = ?e, "Failed to reload settings, keeping current");
            }
        }

        self.transcriber = config::load_api_key()
            .map(|key| Arc::new(GroqTranscriber::new(key)) as Arc<dyn Transcriber>);
        if self.transcriber.is_none() {
            warn!("No API key after reload, transcription disabled");
        }
    }

    /// Map tray menu clicks onto the command queue so they take the same
    /// serialized path as every other trigger.
    #[instrument(skip(self, event))]
    async fn handle_tray_event(&mut self, event: MenuEvent) {
        let cmd = if event.id == self.reload_menu_id {
            AppCommand::ReloadSettings
        } else if event.id == self.exit_menu_id {
            info!("Exit requested from tray menu");
            AppCommand::Shutdown
        } else {
            return;
        };

        if let Err(e) = self.command_tx.send(cmd).await {
            error!(error = %e, "Failed to enqueue tray command");
        }
    }

    /// Terminal bookkeeping shared by every path that closes a session:
    /// final toast, auto-hide, tray back to idle, state back to Idle.
    fn finish_session(&mut self, final_toast: ToastCommand) {
        self.toast(final_toast);
        self.toast(ToastCommand::HideAfter(TOAST_HIDE_DELAY));
        self.ui.send(UiCommand::SetTray(TrayIconState::Idle));
        self.state = RecordingState::Idle;
    }

    fn toast(&self, cmd: ToastCommand) {
        self.ui.send(UiCommand::Toast(cmd));
    }
}

/// Write the WAV artifact, read it back as the upload payload, call the
/// transcriber, and delete the artifact regardless of which branch was
/// taken. Deletion failure is logged, not fatal.
async fn run_transcription(
    artifact_path: &Path,
    wav: Vec<u8>,
    transcriber: Arc<dyn Transcriber>,
) -> AppResult<String> {
    let result = write_and_transcribe(artifact_path, wav, transcriber).await;

    if let Err(e) = tokio::fs::remove_file(artifact_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(artifact = ?artifact_path, error = %e, "Failed to delete audio artifact");
        }
    }

    result
}

async fn write_and_transcribe(
    artifact_path: &Path,
    wav: Vec<u8>,
    transcriber: Arc<dyn Transcriber>,
) -> AppResult<String> {
    tokio::fs::write(artifact_path, &wav).await?;
    let payload = tokio::fs::read(artifact_path).await?;

    debug!(artifact = ?artifact_path, byte_len = payload.len(), "Audio artifact staged");

    Ok(transcriber.transcribe(payload).await?)
}
