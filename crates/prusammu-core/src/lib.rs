//! # PrusaMMU Core
//!
//! Core types and decoders for PrusaMMU navigation.
//! Provides the MMU state model, wire-message parsing, error and
//! progress code tables, and the filament slot data model.

pub mod error;
pub mod filament;
pub mod mmu;

pub use error::{CommandError, Error, Result, SessionError, SettingsError, SourceError};

pub use filament::{placeholder_slots, FilamentSlot, MMU_SLOTS};

pub use mmu::{
    error_codes::{lookup_error, ErrorDescriptor, UNKNOWN_ERROR},
    progress_codes::{lookup_progress, UNKNOWN_PROGRESS},
    MmuEvent, MmuState, NavPayload, PluginMessage, Protocol, ResponseCode, ToolField,
};
