//! Serial event loop tying the auth-state observer and sign-out operation to UI effects.

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    auth_state::AuthStateObserver, backend::AuthBackend, scope::Scope, sign_out::SignOutOperation,
};

use super::{
    events::{ControllerEvent, InvocationId, SessionEffects, UiEffect},
    reducer::{SessionReducer, SessionState, SignOutDecision, SignOutState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub session: SessionState,
    pub sign_out: SignOutState,
}

impl ControllerSnapshot {
    fn of(reducer: &SessionReducer) -> Self {
        Self {
            session: reducer.session_state(),
            sign_out: reducer.sign_out_state(),
        }
    }
}

/// Owns the auth-state subscription and sign-out invocations for one screen.
///
/// Runs inside a child of the scope passed to [`SessionController::start`]. Closing
/// either scope, [`SessionController::shutdown`], or dropping the controller ends the
/// loop and unsubscribes from the backend; in-flight sign-outs finish but their results
/// are discarded. Only `shutdown().await` guarantees that no effect is dispatched after
/// it returns: dropping closes the scope without waiting, so an effect callback already
/// running on another worker may still complete.
pub struct SessionController {
    events: mpsc::UnboundedSender<ControllerEvent>,
    state: watch::Receiver<ControllerSnapshot>,
    scope: Scope,
    task: Option<JoinHandle<Option<()>>>,
}

impl SessionController {
    // Must be called from within a tokio runtime.
    pub fn start(
        backend: Arc<dyn AuthBackend>,
        effects: Arc<dyn SessionEffects>,
        scope: &Scope,
    ) -> Self {
        let scope = scope.child();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let reducer = SessionReducer::new();
        let (state_tx, state_rx) = watch::channel(ControllerSnapshot::of(&reducer));

        let worker = ControllerLoop {
            reducer,
            observer: AuthStateObserver::new(Arc::clone(&backend)),
            sign_out: SignOutOperation::new(backend),
            effects,
            events: events_tx.clone(),
            state: state_tx,
            scope: scope.clone(),
        };
        let task = scope.spawn(worker.run(events_rx));

        Self {
            events: events_tx,
            state: state_rx,
            scope,
            task: Some(task),
        }
    }

    pub fn on_sign_out_requested(&self) {
        if self.events.send(ControllerEvent::SignOutRequested).is_err() {
            debug!("sign-out requested after controller shut down");
        }
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ControllerSnapshot> {
        self.state.clone()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub async fn shutdown(mut self) {
        self.scope.close();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("session controller task failed: {err}");
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.scope.close();
    }
}

struct ControllerLoop {
    reducer: SessionReducer,
    observer: AuthStateObserver,
    sign_out: SignOutOperation,
    effects: Arc<dyn SessionEffects>,
    events: mpsc::UnboundedSender<ControllerEvent>,
    state: watch::Sender<ControllerSnapshot>,
    scope: Scope,
}

impl ControllerLoop {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<ControllerEvent>) {
        let mut signals = self.observer.observe();
        let mut signals_open = true;
        info!("session controller started");

        loop {
            tokio::select! {
                signal = signals.next(), if signals_open => match signal {
                    Some(signal) => {
                        debug!(%signal, "auth signal received");
                        let effect = self.reducer.on_auth_signal(signal);
                        self.dispatch(effect);
                    }
                    None => {
                        warn!("auth state stream ended; session track frozen");
                        signals_open = false;
                    }
                },
                Some(event) = events.recv() => self.handle(event),
            }
            self.publish();
        }
    }

    fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::SignOutRequested => match self.reducer.on_sign_out_requested() {
                SignOutDecision::Start(invocation) => self.launch_sign_out(invocation),
                SignOutDecision::AlreadyInProgress(_) | SignOutDecision::SessionEnded => {}
            },
            ControllerEvent::SignOut {
                invocation,
                envelope,
            } => {
                let effects = self.reducer.on_sign_out_envelope(invocation, envelope);
                self.dispatch(effects);
            }
        }
    }

    // Not tied to the controller scope: the backend call runs to completion and its
    // envelopes are discarded if the loop is gone.
    fn launch_sign_out(&self, invocation: InvocationId) {
        let mut envelopes = self.sign_out.invoke();
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(envelope) = envelopes.next().await {
                let event = ControllerEvent::SignOut {
                    invocation,
                    envelope,
                };
                if let Err(mpsc::error::SendError(event)) = events.send(event) {
                    debug!(
                        invocation = invocation.0,
                        ?event,
                        "controller gone; discarding sign-out envelope"
                    );
                }
            }
        });
    }

    fn dispatch(&self, effects: impl IntoIterator<Item = UiEffect>) {
        for effect in effects {
            if self.scope.is_closed() {
                debug!(?effect, "scope closed; effect dropped");
                continue;
            }
            debug!(?effect, "dispatching ui effect");
            self.effects.apply(&effect);
        }
    }

    fn publish(&self) {
        self.state.send_replace(ControllerSnapshot::of(&self.reducer));
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
