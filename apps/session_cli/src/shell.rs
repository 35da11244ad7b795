//! Terminal stand-in for the UI shell: receives controller effects over a bounded
//! queue and renders them.

use std::{io::Write, time::Duration};

use anyhow::{bail, Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use session_core::{ErrorMessage, SessionEffects, UiEffect};
use tracing::{debug, warn};

use crate::config::OutputFormat;

pub const UI_QUEUE_CAPACITY: usize = 64;

/// Forwards controller effects to the shell thread without blocking the controller.
pub struct ChannelEffects {
    ui_tx: Sender<UiEffect>,
}

impl ChannelEffects {
    pub fn new(ui_tx: Sender<UiEffect>) -> Self {
        Self { ui_tx }
    }

    // A full queue drops the effect, HideBusy included. One invocation emits at most
    // three effects, far below UI_QUEUE_CAPACITY while the shell keeps draining.
    fn forward(&self, effect: UiEffect) {
        match self.ui_tx.try_send(effect) {
            Ok(()) => debug!("queued controller->ui effect"),
            Err(TrySendError::Full(effect)) => {
                warn!(?effect, "ui effect queue is full; dropping effect");
            }
            Err(TrySendError::Disconnected(effect)) => {
                debug!(?effect, "ui shell disconnected; dropping effect");
            }
        }
    }
}

impl SessionEffects for ChannelEffects {
    fn show_busy(&self) {
        self.forward(UiEffect::ShowBusy);
    }

    fn hide_busy(&self) {
        self.forward(UiEffect::HideBusy);
    }

    fn show_error(&self, message: &ErrorMessage) {
        self.forward(UiEffect::ShowError(message.clone()));
    }

    fn redirect_to_auth_entry(&self) {
        self.forward(UiEffect::RedirectToAuthEntry);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    Redirected,
    Failed(ErrorMessage),
}

/// Renders effects until the session redirects or a failed sign-out has cleared its
/// busy indicator.
pub fn run(
    ui_rx: &Receiver<UiEffect>,
    format: OutputFormat,
    effect_timeout: Duration,
    out: &mut impl Write,
) -> Result<ShellOutcome> {
    let mut busy = false;
    let mut error: Option<ErrorMessage> = None;

    loop {
        let effect = match ui_rx.recv_timeout(effect_timeout) {
            Ok(effect) => effect,
            Err(RecvTimeoutError::Timeout) => {
                bail!("no ui effect within {}ms", effect_timeout.as_millis())
            }
            Err(RecvTimeoutError::Disconnected) => bail!("session controller disconnected"),
        };
        render(&effect, format, out)?;

        match effect {
            UiEffect::ShowBusy => busy = true,
            UiEffect::HideBusy => {
                busy = false;
                if let Some(message) = error.take() {
                    return Ok(ShellOutcome::Failed(message));
                }
            }
            UiEffect::ShowError(message) => {
                if !busy {
                    return Ok(ShellOutcome::Failed(message));
                }
                error = Some(message);
            }
            UiEffect::RedirectToAuthEntry => return Ok(ShellOutcome::Redirected),
        }
    }
}

fn render(effect: &UiEffect, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let line = serde_json::to_string(effect).context("failed to encode ui effect")?;
            writeln!(out, "{line}")?;
        }
        OutputFormat::Text => match effect {
            UiEffect::ShowBusy => writeln!(out, "[busy] signing out...")?,
            UiEffect::HideBusy => writeln!(out, "[busy] done")?,
            UiEffect::ShowError(message) => writeln!(out, "[error] {message}")?,
            UiEffect::RedirectToAuthEntry => {
                writeln!(out, "[navigate] session ended; returning to sign-in")?
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
