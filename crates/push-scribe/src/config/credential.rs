//! API key storage.
//!
//! The key lives in `credential.key` next to the settings file, base64
//! encoded. This is obfuscation, not encryption, and is documented as
//! such: the threat model is shoulder-surfing and accidental pastes, not
//! a determined local attacker. Absence of the key is a distinguished
//! state, not an error; recording still works, transcription is skipped.

use crate::{AppResult, config::settings::config_dir};

use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{info, instrument, warn};

fn credential_path() -> AppResult<PathBuf> {
    Ok(config_dir()?.join("credential.key"))
}

/// Load the API key, or `None` when absent or unreadable.
///
/// A corrupt file is treated exactly like a missing one (logged): the
/// user re-enters the key, the app never crashes over it.
#[instrument]
pub fn load_api_key() -> Option<String> {
    let path = credential_path().ok()?;
    load_api_key_from(&path)
}

/// Store the API key under the reversible encoding.
#[instrument(skip(key))]
pub fn save_api_key(key: &str) -> AppResult<()> {
    let path = credential_path()?;
    save_api_key_to(&path, key)
}

pub(crate) fn load_api_key_from(path: &Path) -> Option<String> {
    let encoded = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(error = %e, "Failed to read credential file");
            return None;
        }
    };

    let decoded = match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Credential file is corrupt, ignoring");
            return None;
        }
    };

    match String::from_utf8(decoded) {
        Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Credential file is not valid UTF-8, ignoring");
            None
        }
    }
}

pub(crate) fn save_api_key_to(path: &Path, key: &str) -> AppResult<()> {
    let encoded = STANDARD.encode(key.trim().as_bytes());
    fs::write(path, encoded)?;
    info!(credential_path = ?path, "API key stored");
    Ok(())
}
