//! External spool tracker integrations.
//!
//! Filament Manager and Spool Manager are separate host plugins with
//! their own spool databases. The host adapts each behind the
//! [`SpoolTracker`] trait; these sources translate tracker records into
//! filament slots. Tracker-backed slots are always enabled.

use super::{FilamentSource, SourceKind};
use prusammu_core::{FilamentSlot, SourceError, MMU_SLOTS};
use std::sync::Arc;

/// One spool as reported by an external tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolRecord {
    /// 0-based hardware position the spool is assigned to.
    pub index: usize,
    /// Spool name.
    pub name: String,
    /// Material type, may be empty.
    pub material: String,
    /// Display color, may be empty.
    pub color: String,
}

/// Host-implemented query seam for an external spool database.
pub trait SpoolTracker: Send + Sync {
    /// Integration identifier for logging.
    fn integration(&self) -> &str;

    /// Spools currently assigned to MMU positions.
    fn spools(&self) -> Result<Vec<SpoolRecord>, SourceError>;
}

fn tracker_slots(
    kind: SourceKind,
    tracker: &Option<Arc<dyn SpoolTracker>>,
) -> Result<Vec<FilamentSlot>, SourceError> {
    let tracker = tracker.as_ref().ok_or_else(|| SourceError::IntegrationUnavailable {
        integration: kind.to_string(),
    })?;

    let mut slots = Vec::new();
    for record in tracker.spools()? {
        if record.index >= MMU_SLOTS {
            tracing::warn!(
                integration = tracker.integration(),
                index = record.index,
                "dropping spool record outside the slot range"
            );
            continue;
        }
        slots.push(FilamentSlot {
            id: record.index + 1,
            index: record.index,
            name: record.name,
            material: record.material,
            color: record.color,
            enabled: true,
        });
    }
    slots.sort_by_key(|slot| slot.index);
    Ok(slots)
}

/// Slots from the Filament Manager plugin's spool database.
pub struct FilamentManagerSource {
    tracker: Option<Arc<dyn SpoolTracker>>,
}

impl FilamentManagerSource {
    pub fn new(tracker: Option<Arc<dyn SpoolTracker>>) -> Self {
        Self { tracker }
    }
}

impl FilamentSource for FilamentManagerSource {
    fn kind(&self) -> SourceKind {
        SourceKind::FilamentManager
    }

    fn slots(&self) -> Result<Vec<FilamentSlot>, SourceError> {
        tracker_slots(SourceKind::FilamentManager, &self.tracker)
    }
}

/// Slots from the Spool Manager plugin's spool database.
pub struct SpoolManagerSource {
    tracker: Option<Arc<dyn SpoolTracker>>,
}

impl SpoolManagerSource {
    pub fn new(tracker: Option<Arc<dyn SpoolTracker>>) -> Self {
        Self { tracker }
    }
}

impl FilamentSource for SpoolManagerSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SpoolManager
    }

    fn slots(&self) -> Result<Vec<FilamentSlot>, SourceError> {
        tracker_slots(SourceKind::SpoolManager, &self.tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTracker(Vec<SpoolRecord>);

    impl SpoolTracker for FakeTracker {
        fn integration(&self) -> &str {
            "fake"
        }

        fn spools(&self) -> Result<Vec<SpoolRecord>, SourceError> {
            Ok(self.0.clone())
        }
    }

    fn record(index: usize, name: &str) -> SpoolRecord {
        SpoolRecord {
            index,
            name: name.to_string(),
            material: "PLA".to_string(),
            color: "#ff0000".to_string(),
        }
    }

    #[test]
    fn test_records_become_enabled_slots() {
        let tracker: Arc<dyn SpoolTracker> =
            Arc::new(FakeTracker(vec![record(2, "Red"), record(0, "Blue")]));
        let source = SpoolManagerSource::new(Some(tracker));

        let slots = source.slots().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].name, "Blue");
        assert_eq!(slots[1].id, 3);
        assert!(slots.iter().all(|s| s.enabled));
    }

    #[test]
    fn test_out_of_range_records_dropped() {
        let tracker: Arc<dyn SpoolTracker> =
            Arc::new(FakeTracker(vec![record(0, "Ok"), record(9, "Bad")]));
        let source = FilamentManagerSource::new(Some(tracker));

        let slots = source.slots().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].name, "Ok");
    }

    #[test]
    fn test_missing_tracker_is_unavailable() {
        let source = FilamentManagerSource::new(None);
        let err = source.slots().unwrap_err();
        assert!(matches!(err, SourceError::IntegrationUnavailable { .. }));
    }
}
