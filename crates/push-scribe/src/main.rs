//! Push-Scribe: push-to-talk dictation into whatever application has focus.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey;
mod hotkey_forwarder;
mod instance_guard;
mod output_handler;
mod paste_key_guard;
mod recording_state;
#[cfg(test)]
mod tests;
mod toaster;
mod tray_icon_state;
mod tray_manager;
mod ui_command;
mod ui_sink;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_forwarder::HotkeyForwarder,
    instance_guard::{InstanceGuard, SystemProbe},
    output_handler::OutputHandler,
    paste_key_guard::PasteKeyGuard,
    recording_state::RecordingState,
    toaster::Toaster,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
    ui_command::{ToastCommand, UiCommand},
    ui_sink::EventLoopSink,
};

use crate::config::Settings;
use crate::hotkey::{HotkeyPlan, SharedRegistry};

use std::{sync::Arc, time::Instant};

use global_hotkey::GlobalHotKeyManager;
use push_scribe_core::{GroqTranscriber, MicCapture, Transcriber};
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{error, info, warn};

/// Temporary WAV artifact name under the system temp directory.
const AUDIO_ARTIFACT_NAME: &str = "push-scribe-audio.wav";

/// Exit code when another instance already holds the lock.
const EXIT_ALREADY_RUNNING: i32 = 2;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("push_scribe=debug")
        .init();

    // Single-instance check before any resource is touched: a second copy
    // would fight over the same hotkeys and audio artifact.
    let guard = match InstanceGuard::acquire(&SystemProbe) {
        Ok(guard) => guard,
        Err(AppError::AlreadyRunning { pid, .. }) => {
            error!(owner_pid = pid, "Another instance is already running");
            std::process::exit(EXIT_ALREADY_RUNNING);
        }
        Err(e) => {
            error!(error = ?e, "Failed to acquire instance lock");
            std::process::exit(1);
        }
    };
    let mut instance_guard = Some(guard);

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "Failed to load settings");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<UiCommand>::with_user_event().build();
    let ui_proxy = event_loop.create_proxy();

    // The tray icon is !Send everywhere, so its manager never leaves this thread.
    let mut tray_manager = match TrayManager::new(settings.theme) {
        Ok(tm) => tm,
        Err(e) => {
            error!(error = ?e, "Failed to create TrayManager");
            std::process::exit(1);
        }
    };

    // Held for the whole run; letting it drop would unbind every hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let registry: SharedRegistry = SharedRegistry::default();

    let mut toaster = Toaster::new();
    let mut hide_deadline: Option<Instant> = None;

    let mut startup_settings = Some(settings);

    event_loop.run(move |event, _, control_flow| {
        if matches!(*control_flow, ControlFlow::ExitWithCode(_)) {
            return;
        }
        *control_flow = match hide_deadline {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        };

        match event {
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                // The scheduled toast auto-hide.
                toaster.expire();
                hide_deadline = None;
                *control_flow = ControlFlow::Wait;
            }
            Event::UserEvent(cmd) => {
                match cmd {
                    UiCommand::Toast(toast_cmd) => {
                        // Any new toast command supersedes a pending hide.
                        hide_deadline = toaster.handle(toast_cmd);
                    }
                    UiCommand::SetTray(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    UiCommand::Rebind(new_settings) => {
                        if let Some(manager) = hotkey_manager.as_ref() {
                            if let Err(e) = hotkey::rebind(manager, &registry, &new_settings) {
                                error!(error = ?e, "Failed to rebind hotkeys");
                            }
                        }
                        if let Err(e) = tray_manager.set_theme(new_settings.theme) {
                            error!(error = ?e, "Failed to re-theme tray icon");
                        }
                    }
                    UiCommand::Shutdown => {
                        // Dropping the manager unregisters all hotkeys;
                        // dropping the guard removes the lock file. Both
                        // happen here so the outcome can still be logged.
                        hotkey_manager.take();
                        instance_guard.take();
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(StartCause::Init) => {
                let Some(settings) = startup_settings.take() else {
                    return;
                };

                let transcriber = build_transcriber();

                let injector = match OutputHandler::new() {
                    Ok(handler) => {
                        Arc::new(Mutex::new(handler)) as Arc<Mutex<dyn output_handler::TextInjector>>
                    }
                    Err(e) => {
                        error!(error = ?e, "Failed to create OutputHandler");
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Hotkeys must be registered on this thread: on Windows
                // their WM_HOTKEY messages arrive on the thread that owns
                // the message pump, which is the tao loop itself.
                let manager = match GlobalHotKeyManager::new() {
                    Ok(m) => m,
                    Err(e) => {
                        error!(error = %e, "Failed to create hotkey manager");
                        std::process::exit(1);
                    }
                };
                if let Err(e) =
                    hotkey::apply(&manager, &registry, &HotkeyPlan::from_settings(&settings))
                {
                    error!(error = ?e, "Failed to register hotkeys");
                    std::process::exit(1);
                }
                hotkey_manager = Some(manager);

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                let ui = Arc::new(EventLoopSink::new(ui_proxy.clone()));
                let forwarder_registry = Arc::clone(&registry);
                let reload_menu_id = tray_manager.reload_item_id().clone();
                let exit_menu_id = tray_manager.exit_item_id().clone();

                // The async half (controller + forwarder) gets its own
                // thread and runtime; everything !Send stays here.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!(error = %e, "Failed to create tokio runtime");
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let forwarder =
                            HotkeyForwarder::new(forwarder_registry, command_tx.clone());

                        let app = App {
                            state: RecordingState::Idle,
                            capture: Box::new(MicCapture::new()),
                            transcriber,
                            injector,
                            ui,
                            settings,
                            artifact_path: std::env::temp_dir().join(AUDIO_ARTIFACT_NAME),
                            command_tx,
                            command_rx,
                            shutdown_tx,
                            reload_menu_id,
                            exit_menu_id,
                            inflight: None,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = forwarder.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey forwarder error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // The manager must outlive every iteration; touching it here keeps
        // it captured by the closure instead of dropped after Init.
        let _ = &hotkey_manager;
    });
}

/// Resolve the transcription credential: the stored key wins, otherwise a
/// `GROQ_API_KEY` environment variable is imported into the store. Without
/// either, the app runs with transcription disabled.
fn build_transcriber() -> Option<Arc<dyn Transcriber>> {
    let key = config::load_api_key().or_else(|| {
        let env_key = std::env::var("GROQ_API_KEY").ok()?;
        let env_key = env_key.trim().to_string();
        if env_key.is_empty() {
            return None;
        }

        info!("Importing API key from GROQ_API_KEY environment variable");
        if let Err(e) = config::save_api_key(&env_key) {
            warn!(error = ?e, "Failed to persist imported API key");
        }
        Some(env_key)
    });

    match key {
        Some(key) => Some(Arc::new(GroqTranscriber::new(key))),
        None => {
            warn!("No API key configured, transcription disabled");
            None
        }
    }
}
