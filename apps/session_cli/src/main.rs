use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use session_core::{InMemoryAuthBackend, Scope, SessionController};
use shared::AuthErrorKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod shell;

use config::{load_settings, OutputFormat, Settings, SimulatedFailure};
use shell::{ChannelEffects, ShellOutcome, UI_QUEUE_CAPACITY};

/// Signs out of a simulated session and renders the resulting UI effects.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "session_cli.toml")]
    config: PathBuf,
    /// Start without an authenticated session.
    #[arg(long)]
    signed_out: bool,
    #[arg(long)]
    latency_ms: Option<u64>,
    /// Make the backend reject the sign-out with this kind of error.
    #[arg(long)]
    fail_kind: Option<AuthErrorKind>,
    #[arg(long)]
    fail_message: Option<String>,
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if self.signed_out {
            settings.signed_in = false;
        }
        if let Some(latency_ms) = self.latency_ms {
            settings.sign_out_latency_ms = latency_ms;
        }
        if self.fail_kind.is_some() || self.fail_message.is_some() {
            let previous = settings.failure.take();
            settings.failure = Some(SimulatedFailure {
                kind: self
                    .fail_kind
                    .or(previous.as_ref().map(|failure| failure.kind))
                    .unwrap_or(AuthErrorKind::Unknown),
                message: self
                    .fail_message
                    .or(previous.map(|failure| failure.message))
                    .unwrap_or_default(),
            });
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    args.apply(&mut settings);
    init_tracing(&settings.log_filter);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build session runtime")?;
    let _runtime_guard = runtime.enter();

    let backend = InMemoryAuthBackend::new(settings.signed_in)
        .with_sign_out_latency(settings.sign_out_latency());
    if let Some(failure) = &settings.failure {
        backend.fail_next_sign_out(failure.to_error());
    }

    let (ui_tx, ui_rx) = bounded(UI_QUEUE_CAPACITY);
    let scope = Scope::new();
    let controller = SessionController::start(
        Arc::new(backend),
        Arc::new(ChannelEffects::new(ui_tx)),
        &scope,
    );
    info!(signed_in = settings.signed_in, "session shell started");
    controller.on_sign_out_requested();

    let outcome = shell::run(
        &ui_rx,
        settings.output,
        settings.effect_timeout(),
        &mut std::io::stdout().lock(),
    );

    scope.close();
    runtime.block_on(controller.shutdown());

    match outcome? {
        ShellOutcome::Redirected => Ok(ExitCode::SUCCESS),
        ShellOutcome::Failed(message) => {
            info!("sign-out failed: {message}");
            Ok(ExitCode::FAILURE)
        }
    }
}
