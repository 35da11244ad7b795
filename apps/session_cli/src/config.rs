use std::{fs, io, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use shared::{AuthBackendError, AuthErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulatedFailure {
    pub kind: AuthErrorKind,
    #[serde(default)]
    pub message: String,
}

impl SimulatedFailure {
    pub fn to_error(&self) -> AuthBackendError {
        AuthBackendError::new(self.kind, self.message.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_filter: String,
    pub signed_in: bool,
    pub sign_out_latency_ms: u64,
    pub effect_timeout_ms: u64,
    pub failure: Option<SimulatedFailure>,
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            signed_in: true,
            sign_out_latency_ms: 250,
            effect_timeout_ms: 5_000,
            failure: None,
            output: OutputFormat::Text,
        }
    }
}

impl Settings {
    pub fn sign_out_latency(&self) -> Duration {
        Duration::from_millis(self.sign_out_latency_ms)
    }

    pub fn effect_timeout(&self) -> Duration {
        Duration::from_millis(self.effect_timeout_ms)
    }
}

/// Defaults, then the TOML file at `path` if present, then `APP__*` environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__SIGNED_IN") {
        settings.signed_in = v
            .trim()
            .parse()
            .with_context(|| format!("APP__SIGNED_IN must be true or false, got '{v}'"))?;
    }

    if let Some(v) = lookup("APP__SIGN_OUT_LATENCY_MS") {
        settings.sign_out_latency_ms = v
            .trim()
            .parse()
            .with_context(|| format!("APP__SIGN_OUT_LATENCY_MS must be an integer, got '{v}'"))?;
    }

    if let Some(v) = lookup("APP__EFFECT_TIMEOUT_MS") {
        settings.effect_timeout_ms = v
            .trim()
            .parse()
            .with_context(|| format!("APP__EFFECT_TIMEOUT_MS must be an integer, got '{v}'"))?;
    }

    if let Some(v) = lookup("APP__FAILURE_KIND") {
        let kind = v.parse::<AuthErrorKind>().map_err(|err| anyhow!(err))?;
        let message = settings
            .failure
            .take()
            .map(|failure| failure.message)
            .unwrap_or_default();
        settings.failure = Some(SimulatedFailure { kind, message });
    }

    if let Some(v) = lookup("APP__FAILURE_MESSAGE") {
        match settings.failure.as_mut() {
            Some(failure) => failure.message = v,
            None => {
                settings.failure = Some(SimulatedFailure {
                    kind: AuthErrorKind::Unknown,
                    message: v,
                })
            }
        }
    }

    if let Some(v) = lookup("APP__OUTPUT") {
        settings.output = <OutputFormat as clap::ValueEnum>::from_str(&v, true)
            .map_err(|err| anyhow!("APP__OUTPUT: {err}"))?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
