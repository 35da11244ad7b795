use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use shared::{AuthBackendError, AuthSignal};
use tracing::debug;

use crate::backend::{AuthBackend, ListenerRegistration, SessionListener};

#[derive(Default)]
struct InMemoryState {
    signed_out: bool,
    listeners: BTreeMap<u64, SessionListener>,
    next_listener_id: u64,
    pending_failures: VecDeque<AuthBackendError>,
    sign_out_calls: usize,
}

impl InMemoryState {
    // Listeners run under the state lock so they observe changes in order; they must
    // not call back into the backend.
    fn notify(&self) {
        let signal = AuthSignal(self.signed_out);
        for listener in self.listeners.values() {
            listener(signal);
        }
    }
}

fn lock(state: &Mutex<InMemoryState>) -> MutexGuard<'_, InMemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local [`AuthBackend`] used by the CLI shell and tests.
#[derive(Clone)]
pub struct InMemoryAuthBackend {
    state: Arc<Mutex<InMemoryState>>,
    sign_out_latency: Duration,
}

impl InMemoryAuthBackend {
    pub fn new(signed_in: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                signed_out: !signed_in,
                ..InMemoryState::default()
            })),
            sign_out_latency: Duration::ZERO,
        }
    }

    pub fn with_sign_out_latency(mut self, latency: Duration) -> Self {
        self.sign_out_latency = latency;
        self
    }

    /// Queues a failure for the next `sign_out` call; the session stays active.
    pub fn fail_next_sign_out(&self, err: AuthBackendError) {
        lock(&self.state).pending_failures.push_back(err);
    }

    /// Updates the session and notifies every listener, even if the value is unchanged.
    pub fn set_signed_in(&self, signed_in: bool) {
        let mut state = lock(&self.state);
        state.signed_out = !signed_in;
        state.notify();
    }

    pub fn is_signed_in(&self) -> bool {
        !lock(&self.state).signed_out
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    pub fn sign_out_calls(&self) -> usize {
        lock(&self.state).sign_out_calls
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    fn add_session_listener(&self, listener: SessionListener) -> ListenerRegistration {
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            listener(AuthSignal(state.signed_out));
            state.listeners.insert(id, listener);
            id
        };
        debug!(listener_id = id, "session listener added");

        let state = Arc::downgrade(&self.state);
        ListenerRegistration::new(move || {
            if let Some(state) = state.upgrade() {
                lock(&state).listeners.remove(&id);
                debug!(listener_id = id, "session listener removed");
            }
        })
    }

    async fn sign_out(&self) -> Result<(), AuthBackendError> {
        if !self.sign_out_latency.is_zero() {
            tokio::time::sleep(self.sign_out_latency).await;
        }

        let mut state = lock(&self.state);
        state.sign_out_calls += 1;
        if let Some(err) = state.pending_failures.pop_front() {
            debug!(kind = ?err.kind(), "in-memory sign-out failing: {err}");
            return Err(err);
        }
        state.signed_out = true;
        state.notify();
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/in_memory_tests.rs"]
mod tests;
