//! Reactive session core: observes the authentication session, runs sign-out, and
//! turns both event sources into UI effects on a single serial controller loop.

pub mod auth_state;
pub mod backend;
pub mod controller;
pub mod in_memory;
pub mod scope;
pub mod sign_out;

pub use auth_state::{AuthSignalStream, AuthStateObserver};
pub use backend::{AuthBackend, ListenerRegistration, SessionListener};
pub use controller::{
    events::{InvocationId, SessionEffects, UiEffect},
    orchestration::{ControllerSnapshot, SessionController},
    reducer::{SessionReducer, SessionState, SignOutDecision, SignOutOutcome, SignOutState},
};
pub use in_memory::InMemoryAuthBackend;
pub use scope::Scope;
pub use sign_out::SignOutOperation;

pub use shared::{AuthBackendError, AuthErrorKind, AuthSignal, ErrorMessage, ResponseEnvelope};
