//! Types shared between the session core and the shells that drive it.

pub mod domain;
pub mod error;
pub mod response;

pub use domain::AuthSignal;
pub use error::{AuthBackendError, AuthErrorKind};
pub use response::{ErrorMessage, InvalidErrorMessage, ResponseEnvelope};
