//! PrusaMMU Navigation Crate
//!
//! Turns pushed MMU status events into navbar display state: filament
//! source resolution, the pure navigation deriver, bounded retry for
//! late-loading filament metadata, the selection prompt lifecycle,
//! error popup deduplication, and the session object tying them
//! together for one attach/detach cycle.

pub mod deriver;
pub mod display;
pub mod notify;
pub mod prompt;
pub mod retry;
pub mod session;
pub mod sources;

pub use deriver::{derive, Derivation};
pub use display::{DisplayOptions, DisplayState, NavIcon, INHERITED_COLOR};
pub use notify::{ErrorNotifier, NotificationSink};
pub use prompt::{PromptChoice, PromptController, PromptPresenter, PromptValue};
pub use retry::{RetryScheduler, MAX_RETRY_ATTEMPTS};
pub use session::{
    CommandSink, NavListener, NavListenerHandle, NavSession, PrinterFlags, PrinterStateProvider,
};
pub use sources::{
    FilamentManagerSource, FilamentResolver, FilamentSource, GcodeSource, InternalSource,
    SourceKind, SpoolManagerSource, SpoolRecord, SpoolTracker,
};
