//! MMU protocol vocabulary
//!
//! States, response codes and event payloads pushed by the backend.
//! The raw wire payload (`NavPayload`) is normalized into an `MmuEvent`
//! once at the boundary; everything downstream works with typed values
//! and a protocol tag instead of probing for optional fields.

pub mod error_codes;
pub mod progress_codes;

use serde::{Deserialize, Serialize};

use crate::filament::MMU_SLOTS;

/// Coarse MMU activity state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MmuState {
    /// No unit detected (also the zero value on disconnect).
    #[default]
    NotFound,
    /// Unit is powering up.
    Starting,
    /// Idle and ready.
    Ok,
    /// A filament is loaded to the nozzle.
    Loaded,
    /// Unloading filament from the nozzle.
    Unloading,
    /// Loading filament to the nozzle.
    Loading,
    /// Waiting for user interaction on the printer.
    PausedUser,
    /// Error condition, needs attention.
    Attention,
    /// Preloading filament into the unit (extended protocol).
    LoadingMmu,
    /// Cutting filament (extended protocol).
    Cutting,
    /// Ejecting filament (extended protocol).
    Ejecting,
}

impl MmuState {
    /// Parse a wire state string. Unknown or empty strings map to
    /// `NotFound` rather than failing; the backend may be newer than us.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "STARTING" => Self::Starting,
            "OK" => Self::Ok,
            "LOADED" => Self::Loaded,
            "UNLOADING" => Self::Unloading,
            "LOADING" => Self::Loading,
            "PAUSED_USER" => Self::PausedUser,
            "ATTENTION" => Self::Attention,
            "LOADING_MMU" => Self::LoadingMmu,
            "CUTTING" => Self::Cutting,
            "EJECTING" => Self::Ejecting,
            "NOT_FOUND" => Self::NotFound,
            other => {
                if !other.is_empty() {
                    tracing::warn!("Unknown MMU state '{}', treating as NOT_FOUND", other);
                }
                Self::NotFound
            }
        }
    }
}

// Fail-soft on the wire like `from_wire`: an unknown state string from
// a newer backend deserializes to `NotFound` instead of erroring.
impl<'de> Deserialize<'de> for MmuState {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&s))
    }
}

impl std::fmt::Display for MmuState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Starting => write!(f, "STARTING"),
            Self::Ok => write!(f, "OK"),
            Self::Loaded => write!(f, "LOADED"),
            Self::Unloading => write!(f, "UNLOADING"),
            Self::Loading => write!(f, "LOADING"),
            Self::PausedUser => write!(f, "PAUSED_USER"),
            Self::Attention => write!(f, "ATTENTION"),
            Self::LoadingMmu => write!(f, "LOADING_MMU"),
            Self::Cutting => write!(f, "CUTTING"),
            Self::Ejecting => write!(f, "EJECTING"),
        }
    }
}

/// Single-letter response code of the extended protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    /// Command in progress, response data is a progress code.
    Processing,
    /// Command failed, response data is an error code.
    Error,
    /// Command finished.
    Finished,
    /// Command accepted, starting.
    Accepted,
    /// Command rejected.
    Rejected,
    /// A button on the unit was pressed.
    Button,
}

impl ResponseCode {
    /// Parse the single-letter wire code. Unknown letters yield `None`.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "P" => Some(Self::Processing),
            "E" => Some(Self::Error),
            "F" => Some(Self::Finished),
            "A" => Some(Self::Accepted),
            "R" => Some(Self::Rejected),
            "B" => Some(Self::Button),
            _ => None,
        }
    }

    /// The wire letter for this code.
    pub fn as_letter(&self) -> char {
        match self {
            Self::Processing => 'P',
            Self::Error => 'E',
            Self::Finished => 'F',
            Self::Accepted => 'A',
            Self::Rejected => 'R',
            Self::Button => 'B',
        }
    }
}

/// Backend protocol generation.
///
/// Legacy firmware only reports coarse state and tool; extended
/// firmware adds response codes, progress data and its version string.
/// The tag is decided once when the payload is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Coarse state + tool only.
    #[default]
    Legacy,
    /// Response codes and progress/error data available.
    Extended,
}

/// One normalized status update.
///
/// Immutable once built; the session retains only the latest event for
/// replay on retry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MmuEvent {
    /// Coarse activity state.
    pub state: MmuState,
    /// Addressed tool slot, 0-based, already range-checked.
    pub tool: Option<usize>,
    /// Previously loaded tool slot, 0-based, already range-checked.
    pub previous_tool: Option<usize>,
    /// Response code (extended protocol).
    pub response: Option<ResponseCode>,
    /// Response payload, a hex code string (extended protocol).
    pub response_data: Option<String>,
    /// Protocol generation this event was received under.
    pub protocol: Protocol,
}

/// Raw wire value for a tool field: integer, `""`, or `"T<n>"`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ToolField {
    /// Numeric tool index.
    Number(i64),
    /// String form, possibly empty or `T`-prefixed.
    Text(String),
}

impl Default for ToolField {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl ToolField {
    /// Normalize to a 0-based slot index.
    ///
    /// Empty strings, unparsable text and out-of-range values all yield
    /// `None`; tool lookups must short-circuit to "unknown", never fail.
    pub fn normalize(&self) -> Option<usize> {
        let raw = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim().trim_start_matches('T');
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<i64>().ok()?
            }
        };
        if (0..MMU_SLOTS as i64).contains(&raw) {
            Some(raw as usize)
        } else {
            None
        }
    }
}

/// Raw `nav` payload as pushed by the backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavPayload {
    /// Wire state string.
    pub state: String,
    /// Current tool field.
    pub tool: ToolField,
    /// Previous tool field.
    pub previous_tool: ToolField,
    /// Single-letter response code, extended protocol only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Response data hex string, extended protocol only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_data: Option<String>,
    /// Firmware version string, extended protocol only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prusa_version: Option<String>,
}

impl NavPayload {
    /// Normalize the wire payload into a typed event.
    pub fn to_event(&self) -> MmuEvent {
        let protocol = if self.response.is_some() || self.prusa_version.is_some() {
            Protocol::Extended
        } else {
            Protocol::Legacy
        };
        MmuEvent {
            state: MmuState::from_wire(&self.state),
            tool: self.tool.normalize(),
            previous_tool: self.previous_tool.normalize(),
            response: self
                .response
                .as_deref()
                .and_then(ResponseCode::from_wire),
            response_data: self.response_data.clone().filter(|s| !s.is_empty()),
            protocol,
        }
    }
}

/// Inbound push message from the backend, discriminated by `action`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PluginMessage {
    /// Open the filament selection prompt.
    Show,
    /// Dismiss the filament selection prompt.
    Close,
    /// Update the navigation display.
    Nav(NavPayload),
}
