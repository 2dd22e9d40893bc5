//! Navbar display state
//!
//! The rendered output of the navigation deriver: a flat record of
//! texts, icon classes and colors the host drops into its navbar
//! widget. Icons are Font Awesome classes, matching what the host's
//! stylesheet ships.

use serde::{Deserialize, Serialize};

/// Color value meaning "take the surrounding element's color".
pub const INHERITED_COLOR: &str = "inherited";

/// Navbar icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavIcon {
    /// No icon rendered.
    #[default]
    None,
    Times,
    Spinner,
    Check,
    Fingerprint,
    Warning,
    Question,
    Loaded,
    Unloading,
    Loading,
    Preloading,
    Cutting,
    Ejecting,
}

impl NavIcon {
    /// Font Awesome class string for this icon.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Times => "fa-times",
            Self::Spinner => "fa-spinner fa-spin",
            Self::Check => "fa-check",
            Self::Fingerprint => "fa-fingerprint",
            Self::Warning => "fa-exclamation-triangle",
            Self::Question => "fa-question",
            Self::Loaded => "fa-pen-fancy",
            Self::Unloading => "fa-long-arrow-alt-up",
            Self::Loading => "fa-long-arrow-alt-down",
            Self::Preloading => "fa-long-arrow-alt-right",
            Self::Cutting => "fa-cut",
            Self::Ejecting => "fa-eject",
        }
    }
}

/// Options influencing what the deriver renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Label slots 0-4 instead of 1-5.
    pub index_at_zero: bool,
    /// Icon-only rendering: texts are suppressed, icons and colors stay.
    pub simple_display_mode: bool,
    /// Show the unloading-side detail during a filament change.
    pub advanced_display_mode: bool,
    /// Render the nav region at all.
    pub display_active_filament: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            index_at_zero: false,
            simple_display_mode: false,
            advanced_display_mode: false,
            display_active_filament: true,
        }
    }
}

/// One fully-derived navbar rendering.
///
/// Rebuilt wholesale on every derivation; the host replaces its widget
/// contents rather than patching fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Whether the host should render the nav region at all.
    pub visible: bool,
    /// Coarse MMU status text ("Ready", "Changing Filament...", ...).
    pub action_text: String,
    /// Icon next to the action text.
    pub action_icon: NavIcon,
    /// Active/loading tool description.
    pub tool_text: String,
    /// Color swatch for the active tool.
    pub tool_color: String,
    /// Icon for the active tool.
    pub tool_icon: NavIcon,
    /// Unloading-side description during a filament change.
    pub previous_tool_text: String,
    /// Color swatch for the unloading side.
    pub previous_tool_color: String,
    /// Live progress/error line, extended protocol only.
    pub message_text: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            visible: true,
            action_text: String::new(),
            action_icon: NavIcon::None,
            tool_text: String::new(),
            tool_color: INHERITED_COLOR.to_string(),
            tool_icon: NavIcon::None,
            previous_tool_text: String::new(),
            previous_tool_color: INHERITED_COLOR.to_string(),
            message_text: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let display = DisplayState::default();
        assert!(display.action_text.is_empty());
        assert_eq!(display.tool_color, INHERITED_COLOR);
        assert_eq!(display.previous_tool_color, INHERITED_COLOR);
        assert_eq!(display.tool_icon, NavIcon::None);
    }

    #[test]
    fn test_icon_classes() {
        assert_eq!(NavIcon::Check.css_class(), "fa-check");
        assert_eq!(NavIcon::Spinner.css_class(), "fa-spinner fa-spin");
        assert_eq!(NavIcon::Unloading.css_class(), "fa-long-arrow-alt-up");
        assert_eq!(NavIcon::None.css_class(), "");
    }
}
