use super::*;
use crate::{
    backend::{ListenerRegistration, SessionListener},
    in_memory::InMemoryAuthBackend,
};
use async_trait::async_trait;
use shared::{AuthSignal, ErrorMessage};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::Notify;

struct ScriptedBackend {
    gate: Option<Arc<Notify>>,
    result: fn() -> Result<(), AuthBackendError>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(result: fn() -> Result<(), AuthBackendError>) -> Self {
        Self {
            gate: None,
            result,
            calls: AtomicUsize::new(0),
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(|| Ok(()))
        }
    }
}

#[async_trait]
impl AuthBackend for ScriptedBackend {
    fn add_session_listener(&self, listener: SessionListener) -> ListenerRegistration {
        listener(AuthSignal::ACTIVE);
        ListenerRegistration::new(|| {})
    }

    async fn sign_out(&self) -> Result<(), AuthBackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        (self.result)()
    }
}

async fn collect(operation: &SignOutOperation) -> Vec<ResponseEnvelope<()>> {
    tokio::time::timeout(Duration::from_secs(1), operation.invoke().collect::<Vec<_>>())
        .await
        .expect("operation completes")
}

#[tokio::test]
async fn success_emits_loading_then_success() {
    let backend = InMemoryAuthBackend::new(true);
    let operation = SignOutOperation::new(Arc::new(backend.clone()));

    assert_eq!(
        collect(&operation).await,
        vec![ResponseEnvelope::Loading, ResponseEnvelope::Success(())]
    );
    assert!(!backend.is_signed_in());
}

#[tokio::test]
async fn backend_error_becomes_failure_with_its_message() {
    let backend = InMemoryAuthBackend::new(true);
    backend.fail_next_sign_out(AuthBackendError::Transient("network unreachable".into()));
    let operation = SignOutOperation::new(Arc::new(backend));

    assert_eq!(
        collect(&operation).await,
        vec![
            ResponseEnvelope::Loading,
            ResponseEnvelope::failure("network unreachable"),
        ]
    );
}

#[tokio::test]
async fn blank_backend_error_gets_descriptive_message() {
    let operation = SignOutOperation::new(Arc::new(ScriptedBackend::new(|| {
        Err(AuthBackendError::Rejected(String::new()))
    })));

    let envelopes = collect(&operation).await;
    assert_eq!(envelopes.len(), 2);
    assert_eq!(
        envelopes[1].failure_message().map(ErrorMessage::as_str),
        Some("sign-out was rejected by the authentication service")
    );
}

#[tokio::test]
async fn backend_panic_is_absorbed_as_failure() {
    let operation = SignOutOperation::new(Arc::new(ScriptedBackend::new(|| {
        panic!("token store corrupted")
    })));

    assert_eq!(
        collect(&operation).await,
        vec![
            ResponseEnvelope::Loading,
            ResponseEnvelope::failure("token store corrupted"),
        ]
    );
}

#[tokio::test]
async fn loading_is_emitted_before_backend_is_called() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(ScriptedBackend::gated(Arc::clone(&gate)));
    let operation = SignOutOperation::new(backend.clone());

    let mut envelopes = operation.invoke();
    assert_eq!(envelopes.next().await, Some(ResponseEnvelope::Loading));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

    gate.notify_one();
    assert_eq!(envelopes.next().await, Some(ResponseEnvelope::Success(())));
    assert_eq!(envelopes.next().await, None);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_invocation_is_independent() {
    let backend = InMemoryAuthBackend::new(true);
    backend.fail_next_sign_out(AuthBackendError::Unknown("first attempt".into()));
    let operation = SignOutOperation::new(Arc::new(backend.clone()));

    let first = collect(&operation).await;
    let second = collect(&operation).await;

    assert_eq!(first[1], ResponseEnvelope::failure("first attempt"));
    assert_eq!(second[1], ResponseEnvelope::Success(()));
    assert_eq!(backend.sign_out_calls(), 2);
}
