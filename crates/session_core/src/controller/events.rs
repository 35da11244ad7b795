//! Effects dispatched to the UI shell and events fed into the controller loop.

use serde::Serialize;
use shared::{ErrorMessage, ResponseEnvelope};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InvocationId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", content = "message", rename_all = "snake_case")]
pub enum UiEffect {
    ShowBusy,
    HideBusy,
    ShowError(ErrorMessage),
    RedirectToAuthEntry,
}

pub trait SessionEffects: Send + Sync {
    fn show_busy(&self);
    fn hide_busy(&self);
    fn show_error(&self, message: &ErrorMessage);
    fn redirect_to_auth_entry(&self);

    fn apply(&self, effect: &UiEffect) {
        match effect {
            UiEffect::ShowBusy => self.show_busy(),
            UiEffect::HideBusy => self.hide_busy(),
            UiEffect::ShowError(message) => self.show_error(message),
            UiEffect::RedirectToAuthEntry => self.redirect_to_auth_entry(),
        }
    }
}

impl SessionEffects for mpsc::UnboundedSender<UiEffect> {
    fn show_busy(&self) {
        let _ = self.send(UiEffect::ShowBusy);
    }

    fn hide_busy(&self) {
        let _ = self.send(UiEffect::HideBusy);
    }

    fn show_error(&self, message: &ErrorMessage) {
        let _ = self.send(UiEffect::ShowError(message.clone()));
    }

    fn redirect_to_auth_entry(&self) {
        let _ = self.send(UiEffect::RedirectToAuthEntry);
    }
}

#[derive(Debug)]
pub(crate) enum ControllerEvent {
    SignOutRequested,
    SignOut {
        invocation: InvocationId,
        envelope: ResponseEnvelope<()>,
    },
}
