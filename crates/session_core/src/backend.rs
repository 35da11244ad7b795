use std::{fmt, sync::Arc};

use async_trait::async_trait;
use shared::{AuthBackendError, AuthSignal};

/// Callback invoked with the signed-out indicator.
pub type SessionListener = Arc<dyn Fn(AuthSignal) + Send + Sync>;

/// Handle for a registered [`SessionListener`]. Removing or dropping it unsubscribes.
pub struct ListenerRegistration {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl ListenerRegistration {
    pub fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    pub fn remove(mut self) {
        self.unregister();
    }

    fn unregister(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

/// The authentication backend as seen by the session core.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Registers `listener` for session-state changes.
    ///
    /// Implementations call the listener promptly with the current state and then on
    /// every change until the returned registration is removed. Repeated identical
    /// values are allowed.
    fn add_session_listener(&self, listener: SessionListener) -> ListenerRegistration;

    async fn sign_out(&self) -> Result<(), AuthBackendError>;
}
