mod hotkey;
mod instance_guard;
mod settings;
