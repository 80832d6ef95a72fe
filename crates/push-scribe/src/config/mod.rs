mod credential;
mod settings;

pub(crate) use {
    credential::{load_api_key, save_api_key},
    settings::{Settings, Theme},
};

#[cfg(test)]
pub(crate) use credential::{load_api_key_from, save_api_key_to};
