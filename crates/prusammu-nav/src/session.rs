//! Navigation session
//!
//! Owns everything the navbar needs for one attach/detach lifecycle:
//! the last event, the derived display, the retry budget, the prompt
//! controller, the error notifier and the listener registry. All
//! backend interaction goes through the host-implemented seams
//! [`CommandSink`] and [`PrinterStateProvider`].

use crate::deriver::derive;
use crate::display::{DisplayOptions, DisplayState};
use crate::notify::{ErrorNotifier, NotificationSink};
use crate::prompt::{PromptChoice, PromptController, PromptPresenter, PromptValue};
use crate::retry::RetryScheduler;
use crate::sources::FilamentResolver;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use prusammu_core::{
    CommandError, MmuEvent, MmuState, PluginMessage, Protocol, ResponseCode, Result,
};
use prusammu_settings::{SettingsStore, WatcherHandle};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Coarse printer flags queried once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrinterFlags {
    pub ready: bool,
    pub printing: bool,
    pub paused: bool,
}

/// Outbound command seam to the backend.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Answer the selection prompt with a slot or a skip.
    async fn select_filament(&self, choice: PromptValue) -> anyhow::Result<()>;

    /// Ask the backend to push a fresh status event.
    async fn request_status(&self) -> anyhow::Result<()>;
}

/// Printer state query seam, used to avoid rendering stale MMU state.
#[async_trait]
pub trait PrinterStateProvider: Send + Sync {
    async fn printer_state(&self) -> anyhow::Result<PrinterFlags>;
}

/// Observer of derived display changes.
pub trait NavListener: Send + Sync {
    fn on_display_changed(&self, display: &DisplayState);
}

/// Handle used to unregister a [`NavListener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavListenerHandle(Uuid);

struct SessionInner {
    settings: SettingsStore,
    resolver: FilamentResolver,
    sink: Arc<dyn CommandSink>,
    prompt: PromptController,
    notifier: Mutex<ErrorNotifier>,
    listeners: RwLock<HashMap<Uuid, Arc<dyn NavListener>>>,
    last_event: RwLock<MmuEvent>,
    sequence: AtomicU64,
    retry: Mutex<RetryScheduler>,
    display: RwLock<DisplayState>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

/// One navbar session, constructed on attach and dropped on detach.
pub struct NavSession {
    inner: Arc<SessionInner>,
    settings_watch: WatcherHandle,
}

impl NavSession {
    /// Build a session over the host's seams.
    pub fn new(
        settings: SettingsStore,
        resolver: FilamentResolver,
        sink: Arc<dyn CommandSink>,
        presenter: Arc<dyn PromptPresenter>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let inner = Arc::new(SessionInner {
            settings: settings.clone(),
            resolver,
            sink,
            prompt: PromptController::new(presenter),
            notifier: Mutex::new(ErrorNotifier::new(notifications)),
            listeners: RwLock::new(HashMap::new()),
            last_event: RwLock::new(MmuEvent::default()),
            sequence: AtomicU64::new(0),
            retry: Mutex::new(RetryScheduler::new()),
            display: RwLock::new(DisplayState::default()),
            refresh_task: Mutex::new(None),
        });

        // Settings saves re-derive the nav immediately, so a filament
        // renamed mid-print shows up without waiting for an event.
        let weak = Arc::downgrade(&inner);
        let settings_watch = settings.add_watcher(Box::new(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.resolver.refresh();
                render(&inner, inner.sequence.load(Ordering::SeqCst));
            }
        }));

        Self {
            inner,
            settings_watch,
        }
    }

    /// Dispatch one inbound push message.
    pub async fn handle_message(&self, message: PluginMessage) {
        match message {
            PluginMessage::Show => self.show_prompt().await,
            PluginMessage::Close => self.inner.prompt.close(),
            PluginMessage::Nav(payload) => self.handle_event(payload.to_event()),
        }
    }

    /// Process one normalized status event.
    pub fn handle_event(&self, event: MmuEvent) {
        let inner = &self.inner;
        if inner.settings.with(|s| s.debug) {
            tracing::info!(?event, "raw MMU event");
        }
        let sequence = inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        inner.retry.lock().supersede(sequence);

        match (event.response, event.response_data.as_deref()) {
            (Some(ResponseCode::Error), Some(code)) => inner.notifier.lock().notify(code),
            _ => inner.notifier.lock().reset(),
        }

        *inner.last_event.write() = event;
        render(inner, sequence);
    }

    /// Current derived display.
    pub fn display(&self) -> DisplayState {
        self.inner.display.read().clone()
    }

    /// Last event processed.
    pub fn last_event(&self) -> MmuEvent {
        self.inner.last_event.read().clone()
    }

    /// Register a display-change listener and render the current state
    /// to it immediately.
    pub fn add_listener(&self, listener: Arc<dyn NavListener>) -> NavListenerHandle {
        let id = Uuid::new_v4();
        listener.on_display_changed(&self.inner.display.read());
        self.inner.listeners.write().insert(id, listener);
        NavListenerHandle(id)
    }

    /// Remove a display-change listener.
    pub fn remove_listener(&self, handle: NavListenerHandle) -> bool {
        self.inner.listeners.write().remove(&handle.0).is_some()
    }

    /// Open the selection prompt from the current filament list.
    ///
    /// When a default filament is configured the prompt is skipped and
    /// the default answered directly. The Skip choice is only offered
    /// on the extended protocol, where the firmware accepts it.
    pub async fn show_prompt(&self) {
        let settings = self.inner.settings.read();
        if !settings.enable_prompt {
            tracing::debug!("selection prompt disabled, ignoring show");
            return;
        }

        if settings.use_default_filament {
            if let Some(choice) = settings.default_filament {
                tracing::info!(choice, "answering prompt with the default filament");
                if let Err(e) = self.inner.sink.select_filament(PromptValue::Slot(choice)).await {
                    tracing::warn!(error = %e, "default filament selection failed");
                }
                return;
            }
        }

        let mut choices: Vec<PromptChoice> = self
            .inner
            .resolver
            .filament_list()
            .into_iter()
            .filter(|slot| slot.enabled)
            .map(|slot| PromptChoice {
                value: PromptValue::Slot(slot.index),
                label: slot.display_name(settings.index_at_zero),
                color: if slot.color.is_empty() {
                    crate::display::INHERITED_COLOR.to_string()
                } else {
                    slot.color.clone()
                },
            })
            .collect();

        let extended = self.inner.last_event.read().protocol == Protocol::Extended
            || settings.prusa_version.is_some();
        if extended {
            choices.push(PromptChoice {
                value: PromptValue::Skip,
                label: "Skip".to_string(),
                color: crate::display::INHERITED_COLOR.to_string(),
            });
        }

        self.inner
            .prompt
            .show(choices, Duration::from_secs(u64::from(settings.timeout_secs)));
    }

    /// Forward a user selection to the backend and close the prompt.
    pub async fn select(&self, value: PromptValue) -> Result<()> {
        let value = self.inner.prompt.take_selection(value)?;
        self.inner
            .sink
            .select_filament(value)
            .await
            .map_err(|e| CommandError::DeliveryFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Dismiss the selection prompt, if open.
    pub fn close_prompt(&self) {
        self.inner.prompt.close();
    }

    /// Whether the selection prompt is open.
    pub fn prompt_open(&self) -> bool {
        self.inner.prompt.is_open()
    }

    /// Startup reconciliation against the live printer state.
    ///
    /// An idle-ready printer cannot have filament mid-change, so any
    /// persisted MMU state is stale; reset the nav to Ready instead of
    /// rendering it. Otherwise ask the backend for a fresh push.
    pub async fn startup(&self, provider: &dyn PrinterStateProvider) {
        match provider.printer_state().await {
            Ok(flags) if flags.ready && !flags.printing && !flags.paused => {
                tracing::info!("printer idle, clearing stale MMU state");
                self.handle_event(MmuEvent {
                    state: MmuState::Ok,
                    ..MmuEvent::default()
                });
            }
            Ok(_) => {
                if let Err(e) = self.inner.sink.request_status().await {
                    tracing::warn!(error = %e, "status request failed");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "printer state query failed");
            }
        }
    }

    /// Start the fixed-interval status refresh poll.
    ///
    /// A singleton: calling this while the poll runs is a no-op. The
    /// task stops when the session is dropped.
    pub fn start_refresh_poll(&self, interval: Duration) {
        let mut task = self.inner.refresh_task.lock();
        if task.is_some() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        *task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = inner.sink.request_status().await {
                    tracing::warn!(error = %e, "refresh poll status request failed");
                }
            }
        }));
    }

    /// Stop the refresh poll, if running.
    pub fn stop_refresh_poll(&self) {
        if let Some(task) = self.inner.refresh_task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for NavSession {
    fn drop(&mut self) {
        self.inner.settings.remove_watcher(self.settings_watch);
        self.stop_refresh_poll();
        self.inner.prompt.close();
    }
}

impl std::fmt::Debug for NavSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavSession")
            .field("sequence", &self.inner.sequence.load(Ordering::SeqCst))
            .field("last_event", &self.inner.last_event.read())
            .finish()
    }
}

/// Re-derive the display for the given event sequence and publish it.
///
/// Schedules a bounded retry when the event references a tool the
/// filament list cannot resolve yet; a retry that fires after a newer
/// event has landed discards itself.
fn render(inner: &Arc<SessionInner>, sequence: u64) {
    let event = inner.last_event.read().clone();
    let slots = inner.resolver.filament_list();
    let options = inner.settings.with(|s| DisplayOptions {
        index_at_zero: s.index_at_zero,
        simple_display_mode: s.simple_display_mode,
        advanced_display_mode: s.advanced_display_mode,
        display_active_filament: s.display_active_filament,
    });

    let derivation = derive(&event, &slots, &options);
    *inner.display.write() = derivation.display.clone();
    for listener in inner.listeners.read().values() {
        listener.on_display_changed(&derivation.display);
    }

    if derivation.unresolved_tool && !inner.resolver.fully_populated() {
        let weak = Arc::downgrade(inner);
        inner.retry.lock().schedule(sequence, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Skip the replay if a fresher event has superseded us.
            if inner.sequence.load(Ordering::SeqCst) != sequence {
                tracing::debug!(sequence, "discarding stale retry");
                return;
            }
            render(&inner, sequence);
        });
    }
}
