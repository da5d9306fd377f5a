//! WriterStatus - shared Enabled/Disabled state machine with timed cooldown
//!
//! Composed into concrete writers instead of inherited. State transitions
//! notify subscribed callbacks; `disable_for` arms a one-shot re-enable
//! timer that never blocks the calling write path.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Writer availability state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Available for dispatch
    Enabled,
    /// Demoted; skipped by best-writer selection
    Disabled,
}

/// State-change callback: `(old_state, new_state)`
pub type StateChangeFn = Box<dyn Fn(WriterState, WriterState) + Send + Sync>;

/// Shared writer state machine
pub struct WriterStatus {
    inner: Arc<StatusInner>,
}

struct StatusInner {
    slot: Mutex<StateSlot>,
    subscribers: Mutex<Vec<StateChangeFn>>,
}

struct StateSlot {
    state: WriterState,
    /// Bumped on every re-arm or cancel; a timer only fires when its
    /// captured generation still matches (latest disable wins).
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl WriterStatus {
    /// Create a new status in the Enabled state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatusInner {
                slot: Mutex::new(StateSlot {
                    state: WriterState::Enabled,
                    generation: 0,
                    timer: None,
                }),
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> WriterState {
        self.inner.slot.lock().unwrap().state
    }

    /// Register a state-change callback. Callbacks are invoked synchronously
    /// after the transition, outside the state lock.
    pub fn subscribe(&self, callback: StateChangeFn) {
        self.inner.subscribers.lock().unwrap().push(callback);
    }

    /// Transition to Enabled (no-op when already enabled)
    pub fn enable(&self) {
        self.inner.set_state(WriterState::Enabled);
    }

    /// Transition to Disabled indefinitely, cancelling any pending re-enable
    pub fn disable(&self) {
        {
            let mut slot = self.inner.slot.lock().unwrap();
            slot.generation += 1;
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
        }
        self.inner.set_state(WriterState::Disabled);
    }

    /// Transition to Disabled and arm a one-shot timer that restores Enabled
    /// after `cooldown` - blindly, regardless of whether the underlying
    /// fault actually cleared. Re-arms on repeated calls.
    pub fn disable_for(&self, cooldown: Duration) {
        let transition = {
            let mut slot = self.inner.slot.lock().unwrap();
            slot.generation += 1;
            let generation = slot.generation;
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }

            let inner = Arc::clone(&self.inner);
            slot.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(cooldown).await;
                inner.timer_fired(generation);
            }));

            if slot.state == WriterState::Disabled {
                None
            } else {
                let old = slot.state;
                slot.state = WriterState::Disabled;
                Some((old, WriterState::Disabled))
            }
        };

        if let Some((old, new)) = transition {
            self.inner.notify(old, new);
        }
    }

    /// Cancel the cooldown timer. Part of deterministic teardown; safe to
    /// call more than once.
    pub fn shutdown(&self) {
        let mut slot = self.inner.slot.lock().unwrap();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
    }
}

impl Default for WriterStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WriterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterStatus")
            .field("state", &self.state())
            .finish()
    }
}

impl StatusInner {
    /// Apply a transition under the lock, returning it if the state changed
    fn transition(&self, new: WriterState) -> Option<(WriterState, WriterState)> {
        let mut slot = self.slot.lock().unwrap();
        if slot.state == new {
            return None;
        }
        let old = slot.state;
        slot.state = new;
        Some((old, new))
    }

    /// Transition and notify
    fn set_state(&self, new: WriterState) {
        if let Some((old, new)) = self.transition(new) {
            self.notify(old, new);
        }
    }

    fn timer_fired(&self, generation: u64) {
        let transition = {
            let mut slot = self.slot.lock().unwrap();
            if slot.generation != generation || slot.state != WriterState::Disabled {
                return;
            }
            slot.state = WriterState::Enabled;
            slot.timer = None;
            Some((WriterState::Disabled, WriterState::Enabled))
        };
        if let Some((old, new)) = transition {
            self.notify(old, new);
        }
    }

    fn notify(&self, old: WriterState, new: WriterState) {
        let subscribers = self.subscribers.lock().unwrap();
        for callback in subscribers.iter() {
            callback(old, new);
        }
    }
}
