//! Tri-state envelope reported by every asynchronous operation exposed to the UI layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNSPECIFIED_FAILURE: &str = "operation failed for an unknown reason";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failure message must not be empty")]
pub struct InvalidErrorMessage;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ErrorMessage(String);

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        match Self::try_new(message) {
            Ok(message) => message,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(message: impl Into<String>) -> Result<Self, InvalidErrorMessage> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(InvalidErrorMessage);
        }
        Ok(Self(message))
    }

    pub fn from_error(err: &dyn fmt::Display) -> Self {
        Self::try_new(err.to_string()).unwrap_or_else(|_| Self(UNSPECIFIED_FAILURE.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ErrorMessage {
    type Error = InvalidErrorMessage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ErrorMessage> for String {
    fn from(value: ErrorMessage) -> Self {
        value.0
    }
}

impl AsRef<str> for ErrorMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// One invocation reports `Loading`, then exactly one terminal variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ResponseEnvelope<T> {
    Loading,
    Success(T),
    Failure(ErrorMessage),
}

impl<T> ResponseEnvelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(ErrorMessage::new(message))
    }

    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(ErrorMessage::from_error(&err)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn failure_message(&self) -> Option<&ErrorMessage> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        match self {
            Self::Loading => ResponseEnvelope::Loading,
            Self::Success(value) => ResponseEnvelope::Success(f(value)),
            Self::Failure(message) => ResponseEnvelope::Failure(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_message_verbatim() {
        let envelope = ResponseEnvelope::<()>::failure("network unreachable");
        assert_eq!(
            envelope.failure_message().map(ErrorMessage::as_str),
            Some("network unreachable")
        );
        assert!(envelope.is_terminal());
    }

    #[test]
    #[should_panic(expected = "failure message must not be empty")]
    fn empty_failure_message_fails_fast() {
        let _ = ResponseEnvelope::<()>::failure("   ");
    }

    #[test]
    fn from_result_substitutes_generic_text_for_blank_errors() {
        let envelope = ResponseEnvelope::<()>::from_result(Err(""));
        assert_eq!(
            envelope.failure_message().map(ErrorMessage::as_str),
            Some(UNSPECIFIED_FAILURE)
        );
    }

    #[test]
    fn map_preserves_loading_and_failure() {
        assert_eq!(ResponseEnvelope::<u8>::Loading.map(u32::from), ResponseEnvelope::Loading);
        assert_eq!(
            ResponseEnvelope::Success(2u8).map(|v| u32::from(v) * 2),
            ResponseEnvelope::Success(4u32)
        );
        assert!(ResponseEnvelope::<u8>::failure("rejected")
            .map(u32::from)
            .failure_message()
            .is_some());
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_string(&ResponseEnvelope::<()>::failure("denied")).expect("json");
        assert_eq!(json, r#"{"status":"failure","data":"denied"}"#);

        let loading = serde_json::to_string(&ResponseEnvelope::<()>::Loading).expect("json");
        assert_eq!(loading, r#"{"status":"loading"}"#);
    }

    #[test]
    fn deserialization_rejects_empty_failure() {
        let parsed =
            serde_json::from_str::<ResponseEnvelope<()>>(r#"{"status":"failure","data":""}"#);
        assert!(parsed.is_err());
    }
}
