//! Filament sources
//!
//! Where the navbar's filament list comes from. Each supported source
//! is its own [`FilamentSource`] implementation; the [`FilamentResolver`]
//! selects one from configuration and shields the rest of the crate
//! from integration failures.

mod gcode;
mod internal;
mod tracker;

pub use gcode::GcodeSource;
pub use internal::InternalSource;
pub use tracker::{FilamentManagerSource, SpoolManagerSource, SpoolRecord, SpoolTracker};

pub use prusammu_settings::SourceKind;

use parking_lot::RwLock;
use prusammu_core::{placeholder_slots, FilamentSlot, SourceError, MMU_SLOTS};
use prusammu_settings::SettingsStore;
use std::sync::Arc;

/// A provider of filament slot metadata.
pub trait FilamentSource: Send + Sync {
    /// Which source this is.
    fn kind(&self) -> SourceKind;

    /// Current slot list, at most one entry per hardware position.
    fn slots(&self) -> Result<Vec<FilamentSlot>, SourceError>;
}

/// Selects the active filament source and degrades failures.
///
/// Holds handles to every possible source; `refresh` re-selects the
/// active one from settings. Query errors and empty results never
/// propagate: the caller always gets a usable list.
pub struct FilamentResolver {
    store: SettingsStore,
    filament_manager: Option<Arc<dyn SpoolTracker>>,
    spool_manager: Option<Arc<dyn SpoolTracker>>,
    active: RwLock<Box<dyn FilamentSource>>,
}

impl FilamentResolver {
    /// Build a resolver over the settings store, with optional external
    /// spool tracker integrations.
    pub fn new(
        store: SettingsStore,
        filament_manager: Option<Arc<dyn SpoolTracker>>,
        spool_manager: Option<Arc<dyn SpoolTracker>>,
    ) -> Self {
        let kind = store.with(|s| s.filament_source);
        let active = RwLock::new(Self::select(
            kind,
            &store,
            &filament_manager,
            &spool_manager,
        ));
        Self {
            store,
            filament_manager,
            spool_manager,
            active,
        }
    }

    fn select(
        kind: SourceKind,
        store: &SettingsStore,
        filament_manager: &Option<Arc<dyn SpoolTracker>>,
        spool_manager: &Option<Arc<dyn SpoolTracker>>,
    ) -> Box<dyn FilamentSource> {
        match kind {
            SourceKind::Internal => Box::new(InternalSource::new(store.clone())),
            SourceKind::Gcode => Box::new(GcodeSource::new(store.clone())),
            SourceKind::FilamentManager => {
                Box::new(FilamentManagerSource::new(filament_manager.clone()))
            }
            SourceKind::SpoolManager => {
                Box::new(SpoolManagerSource::new(spool_manager.clone()))
            }
        }
    }

    /// Re-select the active source from the current settings.
    pub fn refresh(&self) {
        let kind = self.store.with(|s| s.filament_source);
        if kind != self.active.read().kind() {
            tracing::info!(source = %kind, "filament source changed");
            *self.active.write() = Self::select(
                kind,
                &self.store,
                &self.filament_manager,
                &self.spool_manager,
            );
        }
    }

    /// The active source kind.
    pub fn kind(&self) -> SourceKind {
        self.active.read().kind()
    }

    /// The filament list from the active source.
    ///
    /// Never fails and never returns an empty list: an unavailable or
    /// failing source is logged and degraded to the 5 blank enabled
    /// placeholder slots.
    pub fn filament_list(&self) -> Vec<FilamentSlot> {
        let active = self.active.read();
        let mut slots = match active.slots() {
            Ok(slots) => slots,
            Err(e) => {
                tracing::warn!(source = %active.kind(), error = %e, "filament source query failed");
                Vec::new()
            }
        };
        if slots.is_empty() {
            return placeholder_slots();
        }
        slots.truncate(MMU_SLOTS);
        slots
    }

    /// Whether every hardware position currently has a slot entry.
    pub fn fully_populated(&self) -> bool {
        self.active
            .read()
            .slots()
            .map(|slots| slots.len() >= MMU_SLOTS)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for FilamentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilamentResolver")
            .field("active", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prusammu_settings::PluginSettings;

    struct FailingTracker;

    impl SpoolTracker for FailingTracker {
        fn integration(&self) -> &str {
            "test"
        }

        fn spools(&self) -> Result<Vec<SpoolRecord>, SourceError> {
            Err(SourceError::QueryFailed {
                integration: "test".to_string(),
                reason: "down".to_string(),
            })
        }
    }

    #[test]
    fn test_failed_source_degrades_to_placeholders() {
        let mut settings = PluginSettings::default();
        settings.filament_source = SourceKind::SpoolManager;
        let store = SettingsStore::with_settings(settings);
        let resolver = FilamentResolver::new(store, None, Some(Arc::new(FailingTracker)));

        let slots = resolver.filament_list();
        assert_eq!(slots.len(), 5);
        assert!(slots.iter().all(|s| s.enabled && s.name.is_empty()));
        assert!(!resolver.fully_populated());
    }

    #[test]
    fn test_missing_integration_degrades_to_placeholders() {
        let mut settings = PluginSettings::default();
        settings.filament_source = SourceKind::FilamentManager;
        let store = SettingsStore::with_settings(settings);
        let resolver = FilamentResolver::new(store, None, None);

        assert_eq!(resolver.filament_list().len(), 5);
    }

    #[test]
    fn test_refresh_follows_settings_change() {
        let store = SettingsStore::new();
        let resolver = FilamentResolver::new(store.clone(), None, None);
        assert_eq!(resolver.kind(), SourceKind::Internal);

        store.update(|s| s.filament_source = SourceKind::Gcode);
        resolver.refresh();
        assert_eq!(resolver.kind(), SourceKind::Gcode);
    }

    #[test]
    fn test_index_matches_id() {
        let store = SettingsStore::new();
        let resolver = FilamentResolver::new(store, None, None);
        for slot in resolver.filament_list() {
            assert_eq!(slot.index, slot.id - 1);
        }
    }
}
