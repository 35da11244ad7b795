use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures::{
    future,
    stream::{self, BoxStream},
    FutureExt, StreamExt,
};
use shared::{AuthBackendError, ResponseEnvelope};
use tracing::{error, info, warn};

use crate::backend::AuthBackend;

/// One-shot sign-out reporting its progress as [`ResponseEnvelope`]s.
#[derive(Clone)]
pub struct SignOutOperation {
    backend: Arc<dyn AuthBackend>,
}

impl SignOutOperation {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self { backend }
    }

    /// Yields `Loading` on the first poll, then exactly one `Success` or `Failure`.
    ///
    /// The backend is not called until the stream is polled past `Loading`. Every
    /// backend failure, including a panic inside the backend call, ends as `Failure`.
    pub fn invoke(&self) -> BoxStream<'static, ResponseEnvelope<()>> {
        let backend = Arc::clone(&self.backend);
        let terminal = async move {
            match AssertUnwindSafe(backend.sign_out()).catch_unwind().await {
                Ok(Ok(())) => {
                    info!("sign-out completed");
                    ResponseEnvelope::Success(())
                }
                Ok(Err(err)) => {
                    warn!(kind = ?err.kind(), "sign-out failed: {err}");
                    ResponseEnvelope::Failure(err.user_message())
                }
                Err(panic) => {
                    let err = AuthBackendError::Unknown(panic_message(&*panic));
                    error!("sign-out backend panicked: {err}");
                    ResponseEnvelope::Failure(err.user_message())
                }
            }
        };

        stream::once(future::ready(ResponseEnvelope::Loading))
            .chain(stream::once(terminal))
            .boxed()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::new()
    }
}

#[cfg(test)]
#[path = "tests/sign_out_tests.rs"]
mod tests;
