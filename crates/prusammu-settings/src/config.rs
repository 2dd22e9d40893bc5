//! Configuration and settings management for PrusaMMU
//!
//! Provides the typed plugin settings struct, defaults, validation and
//! file persistence. Supports JSON and TOML file formats stored in
//! platform-specific directories.
//!
//! Field names on disk keep the key spelling of the plugin's stored
//! settings (`timeout`, `indexAtZero`, `filamentSource`, ...), so an
//! existing settings export loads unchanged.

use prusammu_core::{Error, FilamentSlot, Result, SettingsError, MMU_SLOTS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Timeout applied when the configured value is missing or below 1.
pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

/// Which integration supplies the filament list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SourceKind {
    /// Slots configured in the plugin's own settings.
    #[default]
    #[serde(rename = "prusammu")]
    Internal,
    /// Slots parsed out of the sliced G-code.
    #[serde(rename = "gcode")]
    Gcode,
    /// The Filament Manager plugin's spool database.
    #[serde(rename = "filamentManager")]
    FilamentManager,
    /// The Spool Manager plugin's spool database.
    #[serde(rename = "spoolManager")]
    SpoolManager,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "prusammu"),
            Self::Gcode => write!(f, "gcode"),
            Self::FilamentManager => write!(f, "filamentManager"),
            Self::SpoolManager => write!(f, "spoolManager"),
        }
    }
}

/// One configured filament slot as stored in settings.
///
/// Distinct from [`FilamentSlot`]: this is the persisted form, keyed by
/// the 1-based `id`; the resolver derives the 0-based index from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// 1-based slot id.
    pub id: usize,
    /// User-assigned filament name, may be empty.
    #[serde(default)]
    pub name: String,
    /// Display color, may be empty.
    #[serde(default)]
    pub color: String,
    /// Disabled slots are hidden from selection.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SlotConfig {
    /// Blank enabled slot for the given 1-based id.
    pub fn blank(id: usize) -> Self {
        Self {
            id,
            name: String::new(),
            color: String::new(),
            enabled: true,
        }
    }

    /// Convert to the runtime slot model. `index == id - 1`.
    pub fn to_slot(&self) -> FilamentSlot {
        FilamentSlot {
            id: self.id,
            index: self.id.saturating_sub(1),
            name: self.name.clone(),
            material: String::new(),
            color: self.color.clone(),
            enabled: self.enabled,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT_SECS
}

fn default_slots() -> Vec<SlotConfig> {
    (1..=MMU_SLOTS).map(SlotConfig::blank).collect()
}

/// Complete plugin configuration
///
/// Aggregates all plugin settings and provides file I/O operations.
/// Unknown or missing fields fall back to defaults so partial settings
/// files load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Verbose logging of raw MMU traffic.
    pub debug: bool,
    /// Selection prompt timeout in seconds.
    #[serde(rename = "timeout")]
    pub timeout_secs: u32,
    /// Show the active filament name in the navbar.
    #[serde(rename = "displayActiveFilament")]
    pub display_active_filament: bool,
    /// Icon-only navbar rendering.
    #[serde(rename = "simpleDisplayMode")]
    pub simple_display_mode: bool,
    /// Show previous-tool detail during filament changes.
    #[serde(rename = "advancedDisplayMode")]
    pub advanced_display_mode: bool,
    /// Label slots 0-4 instead of 1-5.
    #[serde(rename = "indexAtZero")]
    pub index_at_zero: bool,
    /// Auto-answer the selection prompt with the default filament.
    #[serde(rename = "useDefaultFilament")]
    pub use_default_filament: bool,
    /// 0-based default filament index, if one is set.
    #[serde(rename = "defaultFilament")]
    pub default_filament: Option<usize>,
    /// Show the selection prompt when the printer pauses for input.
    #[serde(rename = "enablePrompt")]
    pub enable_prompt: bool,
    /// Which integration supplies the filament list.
    #[serde(rename = "filamentSource")]
    pub filament_source: SourceKind,
    /// Slots configured directly in the plugin.
    pub filament: Vec<SlotConfig>,
    /// Slots most recently parsed from G-code.
    #[serde(rename = "gcodeFilament")]
    pub gcode_filament: Vec<SlotConfig>,
    /// Printer firmware version, when reported.
    #[serde(rename = "prusaVersion")]
    pub prusa_version: Option<String>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            debug: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            display_active_filament: true,
            simple_display_mode: false,
            advanced_display_mode: false,
            index_at_zero: false,
            use_default_filament: false,
            default_filament: None,
            enable_prompt: true,
            filament_source: SourceKind::Internal,
            filament: default_slots(),
            gcode_filament: default_slots(),
            prusa_version: None,
        }
    }
}

impl PluginSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(SettingsError::Io)?;

        let mut settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| SettingsError::Parse {
                reason: format!("invalid JSON: {}", e),
            })?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|e| SettingsError::Parse {
                reason: format!("invalid TOML: {}", e),
            })?
        } else {
            return Err(Error::Settings(SettingsError::UnsupportedFormat {
                path: path.display().to_string(),
            }));
        };

        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let mut settings = self.clone();
        settings.normalize();
        settings.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(&settings).map_err(|e| SettingsError::Parse {
                reason: format!("failed to serialize: {}", e),
            })?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(&settings).map_err(|e| SettingsError::Parse {
                reason: format!("failed to serialize: {}", e),
            })?
        } else {
            return Err(Error::Settings(SettingsError::UnsupportedFormat {
                path: path.display().to_string(),
            }));
        };

        std::fs::write(path, content).map_err(SettingsError::Io)?;

        Ok(())
    }

    /// Clamp out-of-range values instead of rejecting them.
    ///
    /// Mirrors the save-time fixups of the stored settings: a timeout
    /// below 1 falls back to the default and slot lists are trimmed to
    /// the hardware's 5 positions.
    pub fn normalize(&mut self) {
        if self.timeout_secs < 1 {
            tracing::warn!(
                timeout = self.timeout_secs,
                "timeout below 1s, falling back to {}s",
                DEFAULT_TIMEOUT_SECS
            );
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        self.filament.truncate(MMU_SLOTS);
        self.gcode_filament.truncate(MMU_SLOTS);
        if let Some(choice) = self.default_filament {
            if choice >= MMU_SLOTS {
                self.default_filament = None;
            }
        }
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs < 1 {
            return Err(Error::Settings(SettingsError::Invalid {
                setting: "timeout".to_string(),
                reason: "must be >= 1".to_string(),
            }));
        }

        for list in [&self.filament, &self.gcode_filament] {
            let mut seen = [false; MMU_SLOTS];
            for slot in list {
                if slot.id < 1 || slot.id > MMU_SLOTS {
                    return Err(Error::Settings(SettingsError::Invalid {
                        setting: "filament".to_string(),
                        reason: format!("slot id {} out of range 1..={}", slot.id, MMU_SLOTS),
                    }));
                }
                if seen[slot.id - 1] {
                    return Err(Error::Settings(SettingsError::Invalid {
                        setting: "filament".to_string(),
                        reason: format!("duplicate slot id {}", slot.id),
                    }));
                }
                seen[slot.id - 1] = true;
            }
        }

        Ok(())
    }
}

/// Default settings file location under the platform config directory.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prusammu")
        .join("settings.json")
}
