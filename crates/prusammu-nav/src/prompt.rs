//! Filament selection prompt
//!
//! Controller for the "choose a filament" prompt the printer raises
//! when a print pauses for manual selection. Rendering is the host's
//! job behind [`PromptPresenter`]; this controller owns the lifecycle:
//! one prompt at a time, auto-close on timeout, idempotent close.

use parking_lot::Mutex;
use prusammu_core::SessionError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// What a prompt choice resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptValue {
    /// A 0-based slot index.
    Slot(usize),
    /// Keep the filament the G-code asked for.
    Skip,
}

/// One selectable entry in the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptChoice {
    pub value: PromptValue,
    /// Display label, already index-adjusted.
    pub label: String,
    /// Swatch color, `inherited` when the slot has none.
    pub color: String,
}

/// Host-implemented prompt rendering seam.
pub trait PromptPresenter: Send + Sync {
    /// Render the prompt with the given choices.
    fn present(&self, choices: &[PromptChoice]);

    /// Tear the prompt down.
    fn dismiss(&self);
}

struct PromptInner {
    open: bool,
    // Distinguishes the prompt a timeout task was armed for; a reshow
    // bumps it so the stale timer cannot close the new prompt.
    generation: u64,
    choices: Vec<PromptChoice>,
    timeout_task: Option<JoinHandle<()>>,
}

/// Lifecycle controller for the selection prompt.
#[derive(Clone)]
pub struct PromptController {
    presenter: Arc<dyn PromptPresenter>,
    inner: Arc<Mutex<PromptInner>>,
}

impl PromptController {
    pub fn new(presenter: Arc<dyn PromptPresenter>) -> Self {
        Self {
            presenter,
            inner: Arc::new(Mutex::new(PromptInner {
                open: false,
                generation: 0,
                choices: Vec::new(),
                timeout_task: None,
            })),
        }
    }

    /// Whether a prompt is currently open.
    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    /// Present the prompt, tearing down any open one first.
    ///
    /// Arms a timeout that auto-closes the prompt with no selection,
    /// mirroring the hardware's own prompt timeout.
    pub fn show(&self, choices: Vec<PromptChoice>, timeout: Duration) {
        // Presenter callbacks run outside the lock; a presenter is free
        // to call back into the controller.
        let (generation, was_open) = {
            let mut inner = self.inner.lock();
            let was_open = std::mem::replace(&mut inner.open, true);
            if let Some(task) = inner.timeout_task.take() {
                task.abort();
            }
            inner.generation += 1;
            inner.choices = choices.clone();
            (inner.generation, was_open)
        };
        if was_open {
            self.presenter.dismiss();
        }

        self.presenter.present(&choices);

        let controller = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let timed_out = {
                let mut inner = controller.inner.lock();
                if inner.open && inner.generation == generation {
                    inner.open = false;
                    inner.timeout_task = None;
                    true
                } else {
                    false
                }
            };
            if timed_out {
                tracing::info!("selection prompt timed out with no choice");
                controller.presenter.dismiss();
            }
        });
        self.inner.lock().timeout_task = Some(task);
    }

    /// Accept a user selection and close the prompt.
    ///
    /// Returns the selected value for the session to forward to the
    /// backend. Fails when no prompt is open or the choice is not one
    /// that was offered.
    pub fn take_selection(&self, value: PromptValue) -> Result<PromptValue, SessionError> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(SessionError::NoActivePrompt);
        }
        if !inner.choices.iter().any(|c| c.value == value) {
            if let PromptValue::Slot(choice) = value {
                return Err(SessionError::ChoiceOutOfRange {
                    choice,
                    max: inner.choices.len(),
                });
            }
            return Err(SessionError::NoActivePrompt);
        }

        inner.open = false;
        if let Some(task) = inner.timeout_task.take() {
            task.abort();
        }
        drop(inner);
        self.presenter.dismiss();
        Ok(value)
    }

    /// Close the prompt. Closing an already-closed prompt is a no-op.
    pub fn close(&self) {
        let was_open = {
            let mut inner = self.inner.lock();
            if let Some(task) = inner.timeout_task.take() {
                task.abort();
            }
            std::mem::replace(&mut inner.open, false)
        };
        if was_open {
            self.presenter.dismiss();
        }
    }
}
