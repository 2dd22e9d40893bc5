//! End-to-end session behavior over mocked host seams.

use async_trait::async_trait;
use parking_lot::Mutex;
use prusammu_core::{ErrorDescriptor, PluginMessage};
use prusammu_nav::{
    CommandSink, DisplayState, FilamentResolver, NavIcon, NavListener, NavSession,
    NotificationSink, PromptChoice, PromptPresenter, PromptValue, MAX_RETRY_ATTEMPTS,
};
use prusammu_settings::{PluginSettings, SettingsStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct MockSink {
    selections: Mutex<Vec<PromptValue>>,
    status_requests: AtomicUsize,
}

#[async_trait]
impl CommandSink for MockSink {
    async fn select_filament(&self, choice: PromptValue) -> anyhow::Result<()> {
        self.selections.lock().push(choice);
        Ok(())
    }

    async fn request_status(&self) -> anyhow::Result<()> {
        self.status_requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct MockPresenter {
    presented: Mutex<Vec<Vec<PromptChoice>>>,
    dismissed: AtomicUsize,
}

impl PromptPresenter for MockPresenter {
    fn present(&self, choices: &[PromptChoice]) {
        self.presented.lock().push(choices.to_vec());
    }

    fn dismiss(&self) {
        self.dismissed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockNotifications {
    calls: Mutex<Vec<String>>,
}

impl NotificationSink for MockNotifications {
    fn show(&self, descriptor: &ErrorDescriptor, _url: &str) {
        self.calls.lock().push(format!("show:{}", descriptor.code));
    }

    fn update(&self, descriptor: &ErrorDescriptor, _url: &str) {
        self.calls.lock().push(format!("update:{}", descriptor.code));
    }

    fn clear(&self) {
        self.calls.lock().push("clear".to_string());
    }
}

#[derive(Default)]
struct CountingListener {
    renders: AtomicUsize,
    last: Mutex<Option<DisplayState>>,
}

impl NavListener for CountingListener {
    fn on_display_changed(&self, display: &DisplayState) {
        self.renders.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some(display.clone());
    }
}

struct Harness {
    session: NavSession,
    sink: Arc<MockSink>,
    presenter: Arc<MockPresenter>,
    notifications: Arc<MockNotifications>,
    store: SettingsStore,
}

fn harness(settings: PluginSettings) -> Harness {
    let store = SettingsStore::with_settings(settings);
    let sink = Arc::new(MockSink::default());
    let presenter = Arc::new(MockPresenter::default());
    let notifications = Arc::new(MockNotifications::default());
    let resolver = FilamentResolver::new(store.clone(), None, None);
    let session = NavSession::new(
        store.clone(),
        resolver,
        sink.clone(),
        presenter.clone(),
        notifications.clone(),
    );
    Harness {
        session,
        sink,
        presenter,
        notifications,
        store,
    }
}

fn nav_message(json: &str) -> PluginMessage {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn ok_event_renders_ready() {
    let h = harness(PluginSettings::default());
    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"OK","tool":""}"#))
        .await;

    let display = h.session.display();
    assert_eq!(display.action_text, "Ready");
    assert_eq!(display.action_icon, NavIcon::Check);
    assert!(display.tool_text.is_empty());
    assert!(display.previous_tool_text.is_empty());
}

#[tokio::test]
async fn listener_sees_every_render() {
    let h = harness(PluginSettings::default());
    let listener = Arc::new(CountingListener::default());
    let handle = h.session.add_listener(listener.clone());
    // Registration renders the current (empty) state once.
    assert_eq!(listener.renders.load(Ordering::SeqCst), 1);

    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"STARTING","tool":""}"#))
        .await;
    assert_eq!(listener.renders.load(Ordering::SeqCst), 2);
    assert_eq!(
        listener.last.lock().as_ref().unwrap().action_text,
        "Starting..."
    );

    assert!(h.session.remove_listener(handle));
    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"OK","tool":""}"#))
        .await;
    assert_eq!(listener.renders.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn unresolved_tool_retries_until_budget() {
    // Slot 4 disabled: the list has 4 entries, tool index 3 unresolved.
    let mut settings = PluginSettings::default();
    settings.filament[3].enabled = false;
    let h = harness(settings);

    let listener = Arc::new(CountingListener::default());
    h.session.add_listener(listener.clone());

    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"LOADED","tool":"T3"}"#))
        .await;

    // Registration render + event render.
    assert_eq!(listener.renders.load(Ordering::SeqCst), 2);

    // Delays grow 1s, 2s, ..., 5s; a minute covers the whole chain.
    tokio::time::sleep(Duration::from_secs(60)).await;
    let expected = 2 + MAX_RETRY_ATTEMPTS as usize;
    assert_eq!(listener.renders.load(Ordering::SeqCst), expected);

    // Budget spent: no further renders however long we wait.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(listener.renders.load(Ordering::SeqCst), expected);
}

#[tokio::test(start_paused = true)]
async fn superseding_event_cancels_pending_retry() {
    let mut settings = PluginSettings::default();
    settings.filament[3].enabled = false;
    let h = harness(settings);

    let listener = Arc::new(CountingListener::default());
    h.session.add_listener(listener.clone());

    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"LOADED","tool":3}"#))
        .await;
    // Resolvable event lands before the first retry fires.
    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"OK","tool":""}"#))
        .await;
    assert_eq!(listener.renders.load(Ordering::SeqCst), 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(listener.renders.load(Ordering::SeqCst), 3);
    assert_eq!(h.session.display().action_text, "Ready");
}

#[tokio::test]
async fn repeated_error_updates_one_popup() {
    let h = harness(PluginSettings::default());
    let error = r#"{"action":"nav","state":"ATTENTION","tool":"","response":"E","responseData":"8001"}"#;

    h.session.handle_message(nav_message(error)).await;
    h.session.handle_message(nav_message(error)).await;
    assert_eq!(
        *h.notifications.calls.lock(),
        vec!["show:04101".to_string(), "update:04101".to_string()]
    );

    // A non-error response clears the identity; the same code re-shows.
    h.session
        .handle_message(nav_message(
            r#"{"action":"nav","state":"LOADING","tool":0,"response":"P","responseData":"5"}"#,
        ))
        .await;
    h.session.handle_message(nav_message(error)).await;
    assert_eq!(h.notifications.calls.lock().last().unwrap(), "show:04101");
}

#[tokio::test]
async fn finished_response_clears_message() {
    let h = harness(PluginSettings::default());
    h.session
        .handle_message(nav_message(
            r#"{"action":"nav","state":"LOADING","tool":0,"response":"P","responseData":"6"}"#,
        ))
        .await;
    assert_eq!(h.session.display().message_text, "Feeding to extruder");

    h.session
        .handle_message(nav_message(
            r#"{"action":"nav","state":"LOADED","tool":0,"response":"F"}"#,
        ))
        .await;
    assert_eq!(h.session.display().message_text, "");
}

#[tokio::test(start_paused = true)]
async fn show_then_close_sends_nothing() {
    let h = harness(PluginSettings::default());

    h.session.handle_message(nav_message(r#"{"action":"show"}"#)).await;
    assert!(h.session.prompt_open());
    assert_eq!(h.presenter.presented.lock().len(), 1);

    h.session.handle_message(nav_message(r#"{"action":"close"}"#)).await;
    assert!(!h.session.prompt_open());
    assert!(h.sink.selections.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn selection_reaches_the_backend() {
    let h = harness(PluginSettings::default());
    h.session.handle_message(nav_message(r#"{"action":"show"}"#)).await;

    h.session.select(PromptValue::Slot(2)).await.unwrap();
    assert_eq!(*h.sink.selections.lock(), vec![PromptValue::Slot(2)]);
    assert!(!h.session.prompt_open());
}

#[tokio::test(start_paused = true)]
async fn skip_offered_only_on_extended_protocol() {
    let h = harness(PluginSettings::default());

    h.session.handle_message(nav_message(r#"{"action":"show"}"#)).await;
    let legacy_choices = h.presenter.presented.lock().last().unwrap().clone();
    assert!(legacy_choices.iter().all(|c| c.value != PromptValue::Skip));
    h.session.close_prompt();

    h.session
        .handle_message(nav_message(
            r#"{"action":"nav","state":"PAUSED_USER","tool":"","response":"B"}"#,
        ))
        .await;
    h.session.handle_message(nav_message(r#"{"action":"show"}"#)).await;
    let extended_choices = h.presenter.presented.lock().last().unwrap().clone();
    assert_eq!(
        extended_choices.last().unwrap().value,
        PromptValue::Skip
    );
}

#[tokio::test(start_paused = true)]
async fn default_filament_answers_without_prompting() {
    let mut settings = PluginSettings::default();
    settings.use_default_filament = true;
    settings.default_filament = Some(1);
    let h = harness(settings);

    h.session.handle_message(nav_message(r#"{"action":"show"}"#)).await;
    assert!(!h.session.prompt_open());
    assert!(h.presenter.presented.lock().is_empty());
    assert_eq!(*h.sink.selections.lock(), vec![PromptValue::Slot(1)]);
}

#[tokio::test]
async fn settings_change_rerenders() {
    let h = harness(PluginSettings::default());
    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"LOADED","tool":0}"#))
        .await;
    assert_eq!(h.session.display().action_text, "Filament 1");

    h.store.update(|s| s.filament[0].name = "Prusament Galaxy".to_string());
    assert_eq!(h.session.display().action_text, "1: Prusament Galaxy");
}

#[tokio::test]
async fn display_mode_settings_take_effect() {
    let h = harness(PluginSettings::default());
    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"LOADED","tool":0}"#))
        .await;
    let display = h.session.display();
    assert!(display.visible);
    assert_eq!(display.action_text, "Filament 1");

    // Simple mode keeps the icon but drops the labels.
    h.store.update(|s| s.simple_display_mode = true);
    let display = h.session.display();
    assert!(display.action_text.is_empty());
    assert_eq!(display.tool_icon, NavIcon::Loaded);

    // Turning the nav off hides the region entirely.
    h.store.update(|s| {
        s.simple_display_mode = false;
        s.display_active_filament = false;
    });
    assert!(!h.session.display().visible);
}

struct FixedPrinter(prusammu_nav::PrinterFlags);

#[async_trait]
impl prusammu_nav::PrinterStateProvider for FixedPrinter {
    async fn printer_state(&self) -> anyhow::Result<prusammu_nav::PrinterFlags> {
        Ok(self.0)
    }
}

#[tokio::test]
async fn startup_on_idle_printer_clears_stale_state() {
    let h = harness(PluginSettings::default());
    // Stale persisted state from a previous connection.
    h.session
        .handle_message(nav_message(r#"{"action":"nav","state":"LOADED","tool":0}"#))
        .await;

    let printer = FixedPrinter(prusammu_nav::PrinterFlags {
        ready: true,
        printing: false,
        paused: false,
    });
    h.session.startup(&printer).await;
    assert_eq!(h.session.display().action_text, "Ready");
    assert_eq!(h.sink.status_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn startup_mid_print_requests_fresh_status() {
    let h = harness(PluginSettings::default());
    let printer = FixedPrinter(prusammu_nav::PrinterFlags {
        ready: false,
        printing: true,
        paused: false,
    });
    h.session.startup(&printer).await;
    assert_eq!(h.sink.status_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn refresh_poll_is_a_singleton() {
    let h = harness(PluginSettings::default());
    h.session.start_refresh_poll(Duration::from_secs(10));
    h.session.start_refresh_poll(Duration::from_secs(10));

    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(h.sink.status_requests.load(Ordering::SeqCst), 3);

    h.session.stop_refresh_poll();
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert_eq!(h.sink.status_requests.load(Ordering::SeqCst), 3);
}
