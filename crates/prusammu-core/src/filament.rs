//! Filament slot model
//!
//! A slot is one addressable filament position on the multi-material
//! unit. Slots carry a 1-based `id` for display and a 0-based `index`
//! for lookups; `index == id - 1` holds for every source.

use serde::{Deserialize, Serialize};

/// Number of physical filament positions on the unit.
pub const MMU_SLOTS: usize = 5;

/// One filament spool position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilamentSlot {
    /// 1-based display id.
    pub id: usize,
    /// 0-based index used for tool lookups.
    pub index: usize,
    /// Spool name, may be empty.
    pub name: String,
    /// Material type (e.g. "PLA"), may be empty.
    #[serde(rename = "type", default)]
    pub material: String,
    /// Display color (CSS color string), may be empty.
    #[serde(default)]
    pub color: String,
    /// Whether the slot is offered for selection.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FilamentSlot {
    /// Create a blank enabled slot for the given 1-based id.
    pub fn blank(id: usize) -> Self {
        Self {
            id,
            index: id - 1,
            name: String::new(),
            material: String::new(),
            color: String::new(),
            enabled: true,
        }
    }

    /// Human-readable name for the slot.
    ///
    /// Renders `"<n>: <name> (<material>)"`, eliding the material when
    /// blank. A blank name renders as the generic `"Filament <n>"`.
    /// `n` is the 1-based id unless `index_at_zero` is set.
    pub fn display_name(&self, index_at_zero: bool) -> String {
        let n = if index_at_zero { self.index } else { self.id };
        if self.name.is_empty() {
            return format!("Filament {}", n);
        }
        if self.material.is_empty() {
            format!("{}: {}", n, self.name)
        } else {
            format!("{}: {} ({})", n, self.name, self.material)
        }
    }
}

/// Synthesize the fallback list of 5 blank enabled slots.
///
/// Used whenever the configured source yields no data so the UI always
/// has something to render.
pub fn placeholder_slots() -> Vec<FilamentSlot> {
    (1..=MMU_SLOTS).map(FilamentSlot::blank).collect()
}
