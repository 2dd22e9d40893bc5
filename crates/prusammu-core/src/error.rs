//! Error handling for PrusaMMU
//!
//! Provides error types for all layers of the plugin:
//! - Source errors (filament source integrations)
//! - Settings errors (configuration loading/validation)
//! - Command errors (outbound backend commands)
//! - Session errors (event handling, prompt lifecycle)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Filament source error type
///
/// Represents failures while querying a filament source. These never
/// propagate past the resolver boundary: the resolver logs them and
/// degrades to the placeholder slot list.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// The selected external integration is not installed or disabled
    #[error("Integration not available: {integration}")]
    IntegrationUnavailable {
        /// The integration identifier.
        integration: String,
    },

    /// The external integration query failed
    #[error("Query to {integration} failed: {reason}")]
    QueryFailed {
        /// The integration identifier.
        integration: String,
        /// The reason the query failed.
        reason: String,
    },

    /// The integration returned a record that could not be adapted
    #[error("Malformed spool record from {integration}: {reason}")]
    MalformedRecord {
        /// The integration identifier.
        integration: String,
        /// The reason the record was rejected.
        reason: String,
    },
}

/// Settings error type
///
/// Represents errors while loading, saving or validating plugin settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read or written
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contents could not be parsed
    #[error("Invalid settings file: {reason}")]
    Parse {
        /// The reason parsing failed.
        reason: String,
    },

    /// Settings file uses an unsupported extension
    #[error("Settings file must be .json or .toml: {path}")]
    UnsupportedFormat {
        /// The offending path.
        path: String,
    },

    /// A settings value failed validation
    #[error("Invalid setting {setting}: {reason}")]
    Invalid {
        /// The setting name.
        setting: String,
        /// The reason the value is invalid.
        reason: String,
    },
}

/// Command error type
///
/// Represents failures sending commands to the backend.
#[derive(Error, Debug, Clone)]
pub enum CommandError {
    /// No command sink is attached
    #[error("No backend command sink attached")]
    NoSink,

    /// The backend rejected the command
    #[error("Command rejected: {reason}")]
    Rejected {
        /// The reason the command was rejected.
        reason: String,
    },

    /// The command could not be delivered
    #[error("Command delivery failed: {reason}")]
    DeliveryFailed {
        /// The reason delivery failed.
        reason: String,
    },
}

/// Session error type
///
/// Represents errors in the event-handling session itself.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// A prompt operation was requested with no prompt configured
    #[error("No selection prompt is configured")]
    NoPrompt,

    /// A selection arrived while no prompt was active
    #[error("No active prompt for selection")]
    NoActivePrompt,

    /// The selection index is outside the slot range
    #[error("Filament choice {choice} out of range (0..{max})")]
    ChoiceOutOfRange {
        /// The rejected choice.
        choice: usize,
        /// The exclusive upper bound.
        max: usize,
    },
}

/// Main error type for PrusaMMU
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Filament source error
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Settings error
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a source error
    pub fn is_source_error(&self) -> bool {
        matches!(self, Error::Source(_))
    }

    /// Check if this is a settings error
    pub fn is_settings_error(&self) -> bool {
        matches!(self, Error::Settings(_))
    }

    /// Check if this is a command error
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Command(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
