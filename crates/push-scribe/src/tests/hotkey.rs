use crate::config::Settings;
use crate::hotkey::{
    HotkeyOps, HotkeyPlan, HotkeyRole, SharedRegistry, apply, parse_combo, rebind,
    select_registrable,
};

use std::cell::RefCell;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Register(HotKey),
    Unregister(HotKey),
}

/// Records every OS-facing call; optionally accepts only a fixed set of
/// combos so registration failures can be staged.
struct RecordingOps {
    log: RefCell<Vec<Op>>,
    accept_only: Option<Vec<HotKey>>,
}

impl RecordingOps {
    fn accepting_all() -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            accept_only: None,
        }
    }

    fn accepting(hotkeys: Vec<HotKey>) -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            accept_only: Some(hotkeys),
        }
    }

    fn take_log(&self) -> Vec<Op> {
        std::mem::take(&mut self.log.borrow_mut())
    }
}

impl HotkeyOps for RecordingOps {
    fn register(&self, hotkey: HotKey) -> bool {
        self.log.borrow_mut().push(Op::Register(hotkey));
        self.accept_only
            .as_ref()
            .is_none_or(|accepted| accepted.contains(&hotkey))
    }

    fn unregister(&self, hotkey: HotKey) {
        self.log.borrow_mut().push(Op::Unregister(hotkey));
    }
}

/// WHAT: A combo string parses into the expected modifiers and key
/// WHY: Settings files carry combos as text; the parse is the contract
#[test]
#[allow(clippy::unwrap_used)]
fn given_default_combo_when_parsed_then_modifiers_and_key_match() {
    // Given/When: Parsing the default push-to-talk combo
    let hotkey = parse_combo("ctrl+alt+o").unwrap();

    // Then: It is Ctrl+Alt+O
    assert_eq!(
        hotkey,
        HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyO)
    );
}

/// WHAT: Modifier aliases and whitespace are accepted
/// WHY: Hand-edited settings files use whichever spelling the user knows
#[test]
#[allow(clippy::unwrap_used)]
fn given_aliases_and_whitespace_when_parsed_then_combo_is_normalized() {
    let hotkey = parse_combo(" Cmd + Option + V ").unwrap();
    assert_eq!(
        hotkey,
        HotKey::new(Some(Modifiers::SUPER | Modifiers::ALT), Code::KeyV)
    );

    let function_key = parse_combo("control+shift+f9").unwrap();
    assert_eq!(
        function_key,
        HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::F9)
    );
}

/// WHAT: Malformed combos are rejected with a parse error
/// WHY: A silent mis-parse would bind the wrong key without any hint
#[test]
fn given_malformed_combos_when_parsed_then_error() {
    // Two non-modifier keys
    assert!(parse_combo("ctrl+a+b").is_err());
    // Unknown token
    assert!(parse_combo("ctrl+alt+banana").is_err());
    // No non-modifier key at all
    assert!(parse_combo("ctrl+alt").is_err());
    assert!(parse_combo("").is_err());
}

/// WHAT: Equal start and stop combos collapse into one hold-to-record binding
/// WHY: Push-to-talk needs press and release of the same registered key
#[test]
fn given_equal_start_stop_combos_when_planned_then_single_hold_binding() {
    // Given: Default settings, where start == stop
    let settings = Settings::default();

    // When: Resolving the plan
    let plan = HotkeyPlan::from_settings(&settings);

    // Then: One hold binding plus the exit binding
    let roles: Vec<_> = plan.bindings().iter().map(|b| b.role).collect();
    assert_eq!(roles, vec![HotkeyRole::RecordHold, HotkeyRole::Exit]);
}

/// WHAT: Distinct start and stop combos get separate press-only bindings
/// WHY: Toggle-style configurations bind two keys instead of one held key
#[test]
fn given_distinct_start_stop_combos_when_planned_then_start_and_stop_bindings() {
    // Given: Settings with different start and stop combos
    let settings = Settings {
        stop_recording_shortcut: "ctrl+alt+p".to_string(),
        ..Settings::default()
    };

    // When: Resolving the plan
    let plan = HotkeyPlan::from_settings(&settings);

    // Then: Start, stop, and exit bindings in that order
    let roles: Vec<_> = plan.bindings().iter().map(|b| b.role).collect();
    assert_eq!(
        roles,
        vec![
            HotkeyRole::RecordStart,
            HotkeyRole::RecordStop,
            HotkeyRole::Exit,
        ]
    );
}

/// WHAT: When the preferred combo is rejected by the OS the first working
/// fallback is selected
/// WHY: A combo taken by another application must not leave the app
/// uncontrollable
#[test]
#[allow(clippy::unwrap_used)]
fn given_rejected_preferred_combo_when_selecting_then_first_fallback_wins() {
    // Given: An OS that rejects the preferred combo
    let preferred = parse_combo("ctrl+alt+o").unwrap();

    // When: Selecting with fallbacks
    let selected = select_registrable("ctrl+alt+o", &["ctrl+alt+f9", "ctrl+shift+f9"], |hk| {
        *hk != preferred
    })
    .unwrap();

    // Then: The first fallback was chosen
    assert_eq!(
        selected,
        HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::F9)
    );
}

/// WHAT: An unparseable preferred combo falls back the same way a rejected
/// one does
/// WHY: A typo in the settings file must degrade to a working binding
#[test]
#[allow(clippy::unwrap_used)]
fn given_unparseable_preferred_combo_when_selecting_then_fallback_wins() {
    let selected =
        select_registrable("ctrl+alt+nosuchkey", &["ctrl+alt+f9"], |_| true).unwrap();

    assert_eq!(
        selected,
        HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::F9)
    );
}

/// WHAT: When every candidate fails selection returns an error
/// WHY: The caller aborts startup rather than running with no controls
#[test]
fn given_all_candidates_rejected_when_selecting_then_error() {
    let result = select_registrable("ctrl+alt+o", &["ctrl+alt+f9"], |_| false);
    assert!(result.is_err());
}

/// WHAT: Rebinding unregisters every old combo before registering any new
/// one, and the registry resolves only the new combos afterwards
/// WHY: An overlap window would let one key event match both generations
#[test]
#[allow(clippy::unwrap_used)]
fn given_new_settings_when_rebinding_then_unbind_all_precedes_bind_all() {
    // Given: Default bindings already applied
    let ops = RecordingOps::accepting_all();
    let registry = SharedRegistry::default();
    apply(&ops, &registry, &HotkeyPlan::from_settings(&Settings::default())).unwrap();
    ops.take_log();

    // When: Rebinding with entirely new combos
    let new_settings = Settings {
        start_recording_shortcut: "ctrl+alt+p".to_string(),
        stop_recording_shortcut: "ctrl+alt+p".to_string(),
        exit_shortcut: "ctrl+alt+q".to_string(),
        ..Settings::default()
    };
    rebind(&ops, &registry, &new_settings).unwrap();

    // Then: Both old combos are unregistered before any register happens
    let old_record = parse_combo("ctrl+alt+o").unwrap();
    let old_exit = parse_combo("ctrl+alt+x").unwrap();
    let log = ops.take_log();
    assert_eq!(
        &log[..2],
        &[Op::Unregister(old_record), Op::Unregister(old_exit)]
    );
    assert!(log[2..].iter().all(|op| matches!(op, Op::Register(_))));

    // And: The registry resolves the new combos and no longer the old
    let new_record = parse_combo("ctrl+alt+p").unwrap();
    let guard = registry.lock().unwrap();
    assert_eq!(guard.role(new_record.id()), Some(HotkeyRole::RecordHold));
    assert_eq!(guard.role(old_record.id()), None);
}

/// WHAT: A failed apply unregisters the combos it already bound
/// WHY: A binding registered with the OS but absent from the registry
/// would swallow key events and block later rebinds of the same combo
#[test]
#[allow(clippy::unwrap_used)]
fn given_later_binding_failure_when_applying_then_earlier_bindings_rolled_back() {
    // Given: An OS that accepts the record combo but nothing else, so the
    // exit binding exhausts its whole fallback list
    let record = parse_combo("ctrl+alt+o").unwrap();
    let ops = RecordingOps::accepting(vec![record]);
    let registry = SharedRegistry::default();

    // When: Applying the default plan
    let result = apply(&ops, &registry, &HotkeyPlan::from_settings(&Settings::default()));

    // Then: The error propagates and the record combo was unbound again
    assert!(result.is_err());
    let log = ops.take_log();
    assert_eq!(log.last(), Some(&Op::Unregister(record)));

    // And: Nothing was published
    let guard = registry.lock().unwrap();
    assert_eq!(guard.role(record.id()), None);
}

/// WHAT: A fallback equal to the preferred combo is not tried twice
/// WHY: Retrying the identical combo cannot succeed and hides the real failure
#[test]
fn given_duplicate_fallback_when_selecting_then_tried_once() {
    let mut attempts = 0;
    let result = select_registrable("ctrl+alt+o", &["ctrl+alt+o", "ctrl+alt+f9"], |_| {
        attempts += 1;
        false
    });

    assert!(result.is_err());
    // Preferred once plus the one distinct fallback.
    assert_eq!(attempts, 2);
}
