use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::Stream;
use shared::AuthSignal;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use crate::backend::{AuthBackend, ListenerRegistration};

/// Turns the backend's session listener into a stream of [`AuthSignal`]s.
#[derive(Clone)]
pub struct AuthStateObserver {
    backend: Arc<dyn AuthBackend>,
}

impl AuthStateObserver {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self { backend }
    }

    /// Returns a fresh, independent signal stream. Nothing is registered with the
    /// backend until the stream is first polled; dropping it unsubscribes.
    pub fn observe(&self) -> AuthSignalStream {
        AuthSignalStream {
            state: StreamState::Pending(Arc::clone(&self.backend)),
        }
    }
}

enum StreamState {
    Pending(Arc<dyn AuthBackend>),
    Subscribed {
        signals: UnboundedReceiverStream<AuthSignal>,
        _registration: ListenerRegistration,
    },
}

pub struct AuthSignalStream {
    state: StreamState,
}

impl AuthSignalStream {
    pub fn is_subscribed(&self) -> bool {
        matches!(self.state, StreamState::Subscribed { .. })
    }

    fn subscribe(backend: &dyn AuthBackend) -> StreamState {
        let (tx, rx) = mpsc::unbounded_channel();
        let registration = backend.add_session_listener(Arc::new(move |signal| {
            let _ = tx.send(signal);
        }));
        debug!("auth state subscription opened");
        StreamState::Subscribed {
            signals: UnboundedReceiverStream::new(rx),
            _registration: registration,
        }
    }
}

impl Stream for AuthSignalStream {
    type Item = AuthSignal;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let StreamState::Pending(backend) = &this.state {
            this.state = Self::subscribe(backend.as_ref());
        }
        match &mut this.state {
            StreamState::Subscribed { signals, .. } => Pin::new(signals).poll_next(cx),
            StreamState::Pending(_) => Poll::Pending,
        }
    }
}

#[cfg(test)]
#[path = "tests/auth_state_tests.rs"]
mod tests;
