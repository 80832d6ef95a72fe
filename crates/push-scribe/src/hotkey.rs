//! Global hotkey binding.
//!
//! Combo strings from settings are parsed into modifier/key pairs, mapped
//! to roles (record, stop, exit), and registered on the main thread —
//! tao's event loop pumps the Windows messages needed for `WM_HOTKEY`
//! delivery. When the preferred combo cannot be parsed or registered, a
//! finite fallback list per role keeps the application controllable.
//!
//! Lookup happens on the hotkey callback context via a shared registry;
//! `rebind` swaps the registry only after the old combos are unregistered
//! and the new ones registered, so the very next key event resolves
//! against the new bindings and no window exists where old and new combos
//! are simultaneously bound.

use crate::{AppError, AppResult, config::Settings};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyManager,
    hotkey::{Code, HotKey, Modifiers},
};
use tracing::{info, instrument, warn};

/// Fallback combos tried in order when a record combo fails.
const RECORD_FALLBACKS: &[&str] = &["ctrl+alt+o", "ctrl+alt+f9", "ctrl+shift+f9"];

/// Fallback combos tried in order when the exit combo fails.
const EXIT_FALLBACKS: &[&str] = &["ctrl+alt+x", "ctrl+alt+f10", "ctrl+shift+f10"];

/// What a registered hotkey means to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyRole {
    /// Hold-to-record: press is key-down, release is key-up. Used when the
    /// start and stop combos are the same key (the default, push-to-talk).
    RecordHold,
    /// Press starts recording (distinct start/stop combos).
    RecordStart,
    /// Press stops recording (distinct start/stop combos).
    RecordStop,
    /// Press exits the application.
    Exit,
}

/// One combo a role should be bound to, before any registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBinding {
    /// The combo string as configured in settings.
    pub preferred: String,
    /// Finite ordered fallbacks for when `preferred` fails.
    pub fallbacks: &'static [&'static str],
    /// What the bound key means.
    pub role: HotkeyRole,
}

/// The combos that should be bound, resolved from settings. Pure data,
/// so the role-resolution rules are testable without an OS hotkey manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyPlan {
    bindings: Vec<PlannedBinding>,
}

impl HotkeyPlan {
    /// Resolve settings into planned bindings.
    ///
    /// When the start and stop combos are equal the key acts as
    /// push-to-talk and gets a single `RecordHold` binding; otherwise the
    /// two combos get `RecordStart` and `RecordStop`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut bindings = Vec::new();

        if settings.start_recording_shortcut == settings.stop_recording_shortcut {
            bindings.push(PlannedBinding {
                preferred: settings.start_recording_shortcut.clone(),
                fallbacks: RECORD_FALLBACKS,
                role: HotkeyRole::RecordHold,
            });
        } else {
            bindings.push(PlannedBinding {
                preferred: settings.start_recording_shortcut.clone(),
                fallbacks: RECORD_FALLBACKS,
                role: HotkeyRole::RecordStart,
            });
            bindings.push(PlannedBinding {
                preferred: settings.stop_recording_shortcut.clone(),
                fallbacks: RECORD_FALLBACKS,
                role: HotkeyRole::RecordStop,
            });
        }

        bindings.push(PlannedBinding {
            preferred: settings.exit_shortcut.clone(),
            fallbacks: EXIT_FALLBACKS,
            role: HotkeyRole::Exit,
        });

        Self { bindings }
    }

    /// The planned bindings in registration order.
    pub fn bindings(&self) -> &[PlannedBinding] {
        &self.bindings
    }
}

/// Live hotkey-id to role mapping, shared between the UI thread (which
/// rebinds) and the event forwarder (which looks up incoming events).
#[derive(Debug, Default)]
pub struct HotkeyRegistry {
    roles: HashMap<u32, HotkeyRole>,
    registered: Vec<HotKey>,
}

impl HotkeyRegistry {
    /// Role for a hotkey event id, if the id is currently bound.
    pub fn role(&self, id: u32) -> Option<HotkeyRole> {
        self.roles.get(&id).copied()
    }
}

/// Shared handle to the registry.
pub type SharedRegistry = Arc<Mutex<HotkeyRegistry>>;

/// The OS-facing surface that binding operations need. Keeping it this
/// narrow lets the register/unregister ordering run against a recorder in
/// tests, where no real hotkey manager can exist.
pub trait HotkeyOps {
    /// Try to bind a hotkey; `false` when the OS refuses it.
    fn register(&self, hotkey: HotKey) -> bool;

    /// Unbind a hotkey, best-effort.
    fn unregister(&self, hotkey: HotKey);
}

impl HotkeyOps for GlobalHotKeyManager {
    fn register(&self, hotkey: HotKey) -> bool {
        GlobalHotKeyManager::register(self, hotkey).is_ok()
    }

    fn unregister(&self, hotkey: HotKey) {
        if let Err(e) = GlobalHotKeyManager::unregister(self, hotkey) {
            warn!(hotkey = ?hotkey, error = %e, "Failed to unregister hotkey");
        }
    }
}

/// Register the plan's combos (falling back per role as needed) and
/// publish the result in the registry. Must run on the main thread.
///
/// All-or-nothing: when a later binding exhausts its fallbacks, every
/// combo registered so far is unregistered before the error propagates,
/// so a failed apply never leaves a hotkey bound with the OS that the
/// registry does not know about.
#[instrument(skip(ops, registry, plan))]
pub fn apply(
    ops: &impl HotkeyOps,
    registry: &SharedRegistry,
    plan: &HotkeyPlan,
) -> AppResult<()> {
    let mut roles = HashMap::new();
    let mut registered = Vec::new();

    for binding in plan.bindings() {
        let selected =
            select_registrable(&binding.preferred, binding.fallbacks, |hk| ops.register(*hk));

        let hotkey = match selected {
            Ok(hotkey) => hotkey,
            Err(e) => {
                for hotkey in registered {
                    ops.unregister(hotkey);
                }
                return Err(e);
            }
        };

        info!(role = ?binding.role, hotkey = ?hotkey, "Hotkey bound");
        roles.insert(hotkey.id(), binding.role);
        registered.push(hotkey);
    }

    let mut guard = registry.lock().unwrap_or_else(|e| e.into_inner());
    guard.roles = roles;
    guard.registered = registered;

    Ok(())
}

/// Atomically replace the current bindings with the combos from new
/// settings: unregister-all, then register-all, then publish the new
/// registry contents.
#[instrument(skip(ops, registry, settings))]
pub fn rebind(
    ops: &impl HotkeyOps,
    registry: &SharedRegistry,
    settings: &Settings,
) -> AppResult<()> {
    let old = {
        let mut guard = registry.lock().unwrap_or_else(|e| e.into_inner());
        guard.roles.clear();
        std::mem::take(&mut guard.registered)
    };

    for hotkey in old {
        ops.unregister(hotkey);
    }

    apply(ops, registry, &HotkeyPlan::from_settings(settings))?;

    info!("Hotkeys rebound from reloaded settings");

    Ok(())
}

/// Pick the first combo in `preferred`-then-`fallbacks` order that parses
/// and that `try_register` accepts. A combo already taken by another
/// application is skipped the same way an unparseable one is, so the app
/// never ends up uncontrollable.
pub fn select_registrable(
    preferred: &str,
    fallbacks: &[&str],
    mut try_register: impl FnMut(&HotKey) -> bool,
) -> AppResult<HotKey> {
    let mut last_err: Option<AppError> = None;

    let candidates =
        std::iter::once(preferred).chain(fallbacks.iter().copied().filter(|c| *c != preferred));

    for combo in candidates {
        match parse_combo(combo) {
            Ok(hotkey) if try_register(&hotkey) => return Ok(hotkey),
            Ok(hotkey) => {
                warn!(combo, "Combo could not be registered, trying next fallback");
                last_err = Some(AppError::HotkeyRegistrationFailed {
                    reason: format!("OS rejected {:?}", hotkey),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(e) => {
                warn!(combo, error = %e, "Combo did not parse, trying next fallback");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or(AppError::HotkeyRegistrationFailed {
        reason: "No registrable combo found".to_string(),
        location: ErrorLocation::from(Location::caller()),
    }))
}

/// Parse a combo string like `ctrl+alt+o` into a hotkey.
///
/// Accepts any number of modifier tokens and exactly one non-modifier key.
#[track_caller]
pub fn parse_combo(combo: &str) -> AppResult<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut key: Option<Code> = None;

    for token in combo.split('+') {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            continue;
        }

        if let Some(modifier) = parse_modifier(&token) {
            modifiers |= modifier;
        } else if let Some(code) = parse_key(&token) {
            if key.is_some() {
                return Err(AppError::HotkeyParseFailed {
                    combo: combo.to_string(),
                    reason: "More than one non-modifier key".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            key = Some(code);
        } else {
            return Err(AppError::HotkeyParseFailed {
                combo: combo.to_string(),
                reason: format!("Unknown key token {:?}", token),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    }

    let Some(code) = key else {
        return Err(AppError::HotkeyParseFailed {
            combo: combo.to_string(),
            reason: "No non-modifier key".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    };

    let mods = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };

    Ok(HotKey::new(mods, code))
}

fn parse_modifier(token: &str) -> Option<Modifiers> {
    match token {
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "alt" | "option" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "super" | "cmd" | "meta" | "win" => Some(Modifiers::SUPER),
        _ => None,
    }
}

fn parse_key(token: &str) -> Option<Code> {
    let code = match token {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "space" => Code::Space,
        "tab" => Code::Tab,
        "enter" | "return" => Code::Enter,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" | "del" => Code::Delete,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "period" | "." => Code::Period,
        "comma" | "," => Code::Comma,
        "minus" | "-" => Code::Minus,
        "equal" | "=" => Code::Equal,
        "backquote" | "`" => Code::Backquote,
        _ => return None,
    };
    Some(code)
}
