use crate::{AppError, AppResult};

use std::panic::Location;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use error_location::ErrorLocation;
use tracing::warn;

/// Holds the platform paste modifier (Cmd on macOS, Ctrl elsewhere) for
/// the duration of the paste chord.
///
/// The modifier is pressed in `hold()` and released either explicitly via
/// `release()`, whose failure the caller can observe, or on drop as a
/// safety net when the chord fails partway. A leaked press would leave
/// the keyboard unusable until the user's next physical modifier tap.
pub struct PasteKeyGuard {
    enigo: Enigo,
    released: bool,
}

#[cfg(target_os = "macos")]
const PASTE_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const PASTE_MODIFIER: Key = Key::Control;

impl PasteKeyGuard {
    /// Press the paste modifier and keep it held until release or drop.
    #[track_caller]
    pub(crate) fn hold() -> AppResult<Self> {
        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to create Enigo: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        enigo
            .key(PASTE_MODIFIER, Direction::Press)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to press paste modifier: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            enigo,
            released: false,
        })
    }

    /// Tap a key while the modifier is held.
    #[track_caller]
    pub(crate) fn tap(&mut self, key: Key) -> AppResult<()> {
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to tap key: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Release the modifier, reporting failure to the caller.
    #[track_caller]
    pub(crate) fn release(mut self) -> AppResult<()> {
        self.released = true;
        self.enigo
            .key(PASTE_MODIFIER, Direction::Release)
            .map_err(|e| AppError::AutoPasteFailed {
                reason: format!("Failed to release paste modifier: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Drop for PasteKeyGuard {
    fn drop(&mut self) {
        if !self.released {
            if self.enigo.key(PASTE_MODIFIER, Direction::Release).is_err() {
                warn!("Failed to release paste modifier during unwind");
            }
        }
    }
}
