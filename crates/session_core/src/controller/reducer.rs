//! State transitions for the session and sign-out tracks.
//!
//! The reducer is synchronous and owns no I/O: each input returns the effects to
//! dispatch, in order.

use serde::Serialize;
use shared::{AuthSignal, ResponseEnvelope};
use tracing::{debug, info, warn};

use super::events::{InvocationId, UiEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unknown,
    Active,
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutOutcome {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SignOutState {
    #[default]
    Idle,
    InProgress(InvocationId),
    Completed(SignOutOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutDecision {
    Start(InvocationId),
    AlreadyInProgress(InvocationId),
    SessionEnded,
}

#[derive(Debug, Default)]
pub struct SessionReducer {
    session: SessionState,
    sign_out: SignOutState,
    active_invocation: Option<InvocationId>,
    next_invocation: u64,
}

impl SessionReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_state(&self) -> SessionState {
        self.session
    }

    pub fn sign_out_state(&self) -> SignOutState {
        self.sign_out
    }

    pub fn active_invocation(&self) -> Option<InvocationId> {
        self.active_invocation
    }

    pub fn on_auth_signal(&mut self, signal: AuthSignal) -> Option<UiEffect> {
        let previous = self.session;
        match (previous, signal.is_signed_out()) {
            (SessionState::SignedOut, true) => {
                debug!("repeated signed-out signal ignored");
                None
            }
            (_, true) => {
                self.session = SessionState::SignedOut;
                info!(?previous, "session ended; redirecting to auth entry");
                Some(UiEffect::RedirectToAuthEntry)
            }
            (_, false) => {
                if previous != SessionState::Active {
                    debug!(?previous, "session active");
                }
                self.session = SessionState::Active;
                None
            }
        }
    }

    pub fn on_sign_out_requested(&mut self) -> SignOutDecision {
        if self.session == SessionState::SignedOut {
            debug!("sign-out requested after session ended; ignoring");
            return SignOutDecision::SessionEnded;
        }
        if let Some(invocation) = self.active_invocation {
            debug!(invocation = invocation.0, "sign-out already in progress; ignoring");
            return SignOutDecision::AlreadyInProgress(invocation);
        }

        let invocation = InvocationId(self.next_invocation);
        self.next_invocation += 1;
        self.active_invocation = Some(invocation);
        debug!(invocation = invocation.0, "sign-out invocation started");
        SignOutDecision::Start(invocation)
    }

    pub fn on_sign_out_envelope(
        &mut self,
        invocation: InvocationId,
        envelope: ResponseEnvelope<()>,
    ) -> Vec<UiEffect> {
        if self.active_invocation != Some(invocation) {
            warn!(invocation = invocation.0, "dropping envelope from inactive sign-out invocation");
            return Vec::new();
        }

        let busy = self.sign_out == SignOutState::InProgress(invocation);
        match envelope {
            ResponseEnvelope::Loading => {
                if busy {
                    return Vec::new();
                }
                self.sign_out = SignOutState::InProgress(invocation);
                vec![UiEffect::ShowBusy]
            }
            ResponseEnvelope::Success(()) => {
                self.complete(SignOutOutcome::Succeeded);
                busy.then_some(UiEffect::HideBusy).into_iter().collect()
            }
            ResponseEnvelope::Failure(message) => {
                self.complete(SignOutOutcome::Failed);
                let mut effects = vec![UiEffect::ShowError(message)];
                if busy {
                    effects.push(UiEffect::HideBusy);
                }
                effects
            }
        }
    }

    fn complete(&mut self, outcome: SignOutOutcome) {
        self.sign_out = SignOutState::Completed(outcome);
        self.active_invocation = None;
        debug!(?outcome, "sign-out invocation completed");
    }
}
