//! Filament list from the plugin's own settings.

use super::{FilamentSource, SourceKind};
use prusammu_core::{FilamentSlot, SourceError};
use prusammu_settings::SettingsStore;

/// Slots configured directly in the plugin settings panel.
pub struct InternalSource {
    store: SettingsStore,
}

impl InternalSource {
    pub fn new(store: SettingsStore) -> Self {
        Self { store }
    }
}

impl FilamentSource for InternalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Internal
    }

    fn slots(&self) -> Result<Vec<FilamentSlot>, SourceError> {
        Ok(self.store.with(|s| {
            s.filament
                .iter()
                .filter(|slot| slot.enabled)
                .map(|slot| slot.to_slot())
                .collect()
        }))
    }
}
