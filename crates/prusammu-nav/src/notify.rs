//! Deduplicated hardware error notifications
//!
//! The firmware repeats its error report on every poll while the
//! condition persists. The notifier keeps one popup per distinct error
//! code: repeats update the existing popup in place, and any non-error
//! response resets the tracked identity so a recurrence is surfaced
//! fresh.

use prusammu_core::{lookup_error, ErrorDescriptor};
use std::sync::Arc;

/// Host-implemented popup seam.
pub trait NotificationSink: Send + Sync {
    /// Open a new error popup.
    fn show(&self, descriptor: &ErrorDescriptor, url: &str);

    /// Refresh the content of the already-open popup.
    fn update(&self, descriptor: &ErrorDescriptor, url: &str);

    /// Dismiss the popup.
    fn clear(&self);
}

/// Tracks the last surfaced error to keep popups from stacking.
pub struct ErrorNotifier {
    sink: Arc<dyn NotificationSink>,
    last_code: Option<String>,
}

impl ErrorNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            last_code: None,
        }
    }

    /// Surface a hardware error for the given raw response data.
    ///
    /// Identity is the raw code, not the decoded descriptor: two
    /// distinct raw codes decoding to the same descriptor still count
    /// as a change.
    pub fn notify(&mut self, raw_code: &str) {
        let descriptor = lookup_error(raw_code);
        let url = descriptor.url();
        if self.last_code.as_deref() == Some(raw_code) {
            tracing::debug!(code = raw_code, "repeat error, updating popup in place");
            self.sink.update(descriptor, &url);
        } else {
            tracing::warn!(code = raw_code, error = descriptor.title, "hardware error");
            self.sink.show(descriptor, &url);
            self.last_code = Some(raw_code.to_string());
        }
    }

    /// The error condition cleared; dismiss the popup and forget the
    /// identity so the next occurrence re-shows.
    pub fn reset(&mut self) {
        if self.last_code.take().is_some() {
            self.sink.clear();
        }
    }
}
