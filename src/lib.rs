//! # PrusaMMU
//!
//! Client-side status interpretation and navbar display state for the
//! Prusa Multi-Material Unit: decodes pushed MMU events, resolves
//! filament metadata from the configured source, and derives what the
//! host's navbar, selection prompt and error popups should show.
//!
//! ## Architecture
//!
//! Organized as a workspace with three crates:
//!
//! 1. **prusammu-core** - MMU protocol vocabulary, error/progress code
//!    tables, filament slot model, error types
//! 2. **prusammu-settings** - Typed plugin settings, persistence, the
//!    observable settings store
//! 3. **prusammu-nav** - Filament source resolution, the navigation
//!    deriver, retry scheduling, prompt lifecycle, error popup
//!    deduplication, and the session tying them together
//!
//! The host supplies rendering and transport behind trait seams
//! ([`PromptPresenter`], [`NotificationSink`], [`CommandSink`],
//! [`PrinterStateProvider`], [`NavListener`]); nothing in here touches
//! a DOM or a socket.

pub use prusammu_core::{
    lookup_error, lookup_progress, Error, ErrorDescriptor, FilamentSlot, MmuEvent, MmuState,
    NavPayload, PluginMessage, Protocol, ResponseCode, Result, ToolField, MMU_SLOTS,
    UNKNOWN_ERROR, UNKNOWN_PROGRESS,
};

pub use prusammu_settings::{
    config_path, PluginSettings, SettingsStore, SlotConfig, SourceKind, WatcherHandle,
};

pub use prusammu_nav::{
    derive, CommandSink, Derivation, DisplayOptions, DisplayState, ErrorNotifier,
    FilamentResolver, FilamentSource, NavIcon, NavListener, NavListenerHandle, NavSession,
    NotificationSink, PrinterFlags, PrinterStateProvider, PromptChoice, PromptController,
    PromptPresenter, PromptValue, SpoolRecord, SpoolTracker, INHERITED_COLOR,
};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with console output and `RUST_LOG`
/// environment variable support.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("PrusaMMU v{} logging initialized", VERSION);
    Ok(())
}
