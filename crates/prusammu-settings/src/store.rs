//! Observable settings store
//!
//! Shared handle over the plugin settings with change notification.
//! The navigation session watches the store and re-derives its display
//! state whenever settings are saved, so toggles like `indexAtZero`
//! take effect without waiting for the next MMU event.

use crate::config::PluginSettings;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Callback invoked with the new settings after every update.
pub type SettingsWatcher = Box<dyn Fn(&PluginSettings) + Send + Sync>;

/// Handle used to unregister a settings watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherHandle(Uuid);

/// Thread-safe, observable settings handle.
///
/// Cloning is cheap; all clones share the same underlying settings.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    settings: RwLock<PluginSettings>,
    watchers: RwLock<HashMap<Uuid, SettingsWatcher>>,
}

impl SettingsStore {
    /// Create a store with default settings.
    pub fn new() -> Self {
        Self::with_settings(PluginSettings::default())
    }

    /// Create a store with the given settings.
    pub fn with_settings(settings: PluginSettings) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                settings: RwLock::new(settings),
                watchers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Load the store from a settings file.
    pub fn load(path: &Path) -> prusammu_core::Result<Self> {
        Ok(Self::with_settings(PluginSettings::load_from_file(path)?))
    }

    /// Snapshot of the current settings.
    pub fn read(&self) -> PluginSettings {
        self.inner.settings.read().clone()
    }

    /// Read a value out of the settings without cloning the whole struct.
    pub fn with<R>(&self, f: impl FnOnce(&PluginSettings) -> R) -> R {
        f(&self.inner.settings.read())
    }

    /// Mutate the settings and notify all watchers.
    ///
    /// The write lock is released before watchers run, so a watcher may
    /// read the store without deadlocking.
    pub fn update(&self, f: impl FnOnce(&mut PluginSettings)) {
        let snapshot = {
            let mut guard = self.inner.settings.write();
            f(&mut guard);
            guard.normalize();
            guard.clone()
        };

        tracing::debug!(source = %snapshot.filament_source, "settings updated");
        for watcher in self.inner.watchers.read().values() {
            watcher(&snapshot);
        }
    }

    /// Replace the settings wholesale and notify watchers.
    pub fn replace(&self, settings: PluginSettings) {
        self.update(|current| *current = settings);
    }

    /// Persist the current settings to a file.
    pub fn save(&self, path: &Path) -> prusammu_core::Result<()> {
        self.read().save_to_file(path)
    }

    /// Register a watcher called after every update.
    pub fn add_watcher(&self, watcher: SettingsWatcher) -> WatcherHandle {
        let id = Uuid::new_v4();
        self.inner.watchers.write().insert(id, watcher);
        WatcherHandle(id)
    }

    /// Remove a previously registered watcher.
    pub fn remove_watcher(&self, handle: WatcherHandle) -> bool {
        self.inner.watchers.write().remove(&handle.0).is_some()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("settings", &self.inner.settings.read())
            .field("watchers", &self.inner.watchers.read().len())
            .finish()
    }
}
