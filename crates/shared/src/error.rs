use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::response::ErrorMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    Transient,
    Rejected,
    Unknown,
}

impl AuthErrorKind {
    fn fallback_message(self) -> &'static str {
        match self {
            Self::Transient => "sign-out failed: authentication service unreachable",
            Self::Rejected => "sign-out was rejected by the authentication service",
            Self::Unknown => "sign-out failed for an unknown reason",
        }
    }
}

impl std::str::FromStr for AuthErrorKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transient" => Ok(Self::Transient),
            "rejected" => Ok(Self::Rejected),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!(
                "unknown error kind '{other}' (expected transient, rejected or unknown)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthBackendError {
    #[error("{0}")]
    Transient(String),
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unknown(String),
}

impl AuthBackendError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            AuthErrorKind::Transient => Self::Transient(message),
            AuthErrorKind::Rejected => Self::Rejected(message),
            AuthErrorKind::Unknown => Self::Unknown(message),
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let kind = if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("unreachable")
            || lower.contains("unavailable")
            || lower.contains("dns")
        {
            AuthErrorKind::Transient
        } else if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("denied")
            || lower.contains("rejected")
            || lower.contains("revoked")
        {
            AuthErrorKind::Rejected
        } else {
            AuthErrorKind::Unknown
        };
        Self::new(kind, message)
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::Transient(_) => AuthErrorKind::Transient,
            Self::Rejected(_) => AuthErrorKind::Rejected,
            Self::Unknown(_) => AuthErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transient(message) | Self::Rejected(message) | Self::Unknown(message) => {
                message
            }
        }
    }

    // Blank backend causes fall back to a per-kind description.
    pub fn user_message(&self) -> ErrorMessage {
        ErrorMessage::try_new(self.message())
            .unwrap_or_else(|_| ErrorMessage::new(self.kind().fallback_message()))
    }
}

impl From<anyhow::Error> for AuthBackendError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_message(format!("{err:#}"))
    }
}
