//! Filament list parsed out of the sliced G-code.
//!
//! The backend fills `gcodeFilament` in settings when it scans a print
//! job; this source just reads that cache back.

use super::{FilamentSource, SourceKind};
use prusammu_core::{FilamentSlot, SourceError};
use prusammu_settings::SettingsStore;

/// Slots most recently declared by the loaded G-code.
pub struct GcodeSource {
    store: SettingsStore,
}

impl GcodeSource {
    pub fn new(store: SettingsStore) -> Self {
        Self { store }
    }
}

impl FilamentSource for GcodeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Gcode
    }

    fn slots(&self) -> Result<Vec<FilamentSlot>, SourceError> {
        Ok(self.store.with(|s| {
            s.gcode_filament
                .iter()
                .filter(|slot| slot.enabled)
                .map(|slot| slot.to_slot())
                .collect()
        }))
    }
}
