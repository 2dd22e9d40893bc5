//! PrusaMMU Settings Crate
//!
//! Handles plugin configuration, settings persistence, and the
//! observable settings store the navigation session watches.

pub mod config;
pub mod store;

pub use config::{
    config_path, PluginSettings, SlotConfig, SourceKind, DEFAULT_TIMEOUT_SECS,
};
pub use store::{SettingsStore, SettingsWatcher, WatcherHandle};
