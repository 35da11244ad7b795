use super::{apply_env, load_settings, OutputFormat, Settings, SimulatedFailure};

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use shared::AuthErrorKind;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    env::temp_dir().join(format!("session_cli_{name}_{suffix}.toml"))
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings(&temp_path("missing")).expect("defaults");
    assert_eq!(settings.signed_in, Settings::default().signed_in);
    assert_eq!(settings.sign_out_latency_ms, Settings::default().sign_out_latency_ms);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_path("file");
    fs::write(
        &path,
        r#"
signed_in = false
sign_out_latency_ms = 10
output = "json"

[failure]
kind = "transient"
message = "network unreachable"
"#,
    )
    .expect("write settings");

    let parsed = load_settings(&path).expect("settings");

    assert!(!parsed.signed_in);
    assert_eq!(parsed.sign_out_latency_ms, 10);
    assert_eq!(parsed.output, OutputFormat::Json);
    assert_eq!(parsed.log_filter, "info");
    assert_eq!(
        parsed.failure,
        Some(SimulatedFailure {
            kind: AuthErrorKind::Transient,
            message: "network unreachable".into(),
        })
    );

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn malformed_file_is_an_error() {
    let path = temp_path("malformed");
    fs::write(&path, "signed_in = \"sometimes\"").expect("write settings");

    let err = load_settings(&path).expect_err("parse failure");
    assert!(err.to_string().contains("failed to parse settings file"));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_values() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("APP__SIGNED_IN", "false"),
            ("APP__SIGN_OUT_LATENCY_MS", "0"),
            ("APP__OUTPUT", "JSON"),
            ("APP__LOG_FILTER", "debug"),
        ]),
    )
    .expect("env");

    assert!(!settings.signed_in);
    assert_eq!(settings.sign_out_latency_ms, 0);
    assert_eq!(settings.output, OutputFormat::Json);
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn env_failure_message_without_kind_defaults_to_unknown() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env_of(&[("APP__FAILURE_MESSAGE", "boom")])).expect("env");

    let failure = settings.failure.expect("failure configured");
    assert_eq!(failure.kind, AuthErrorKind::Unknown);
    assert_eq!(failure.to_error().to_string(), "boom");
}

#[test]
fn env_failure_kind_keeps_file_message() {
    let mut settings = Settings {
        failure: Some(SimulatedFailure {
            kind: AuthErrorKind::Unknown,
            message: "server said no".into(),
        }),
        ..Settings::default()
    };
    apply_env(&mut settings, env_of(&[("APP__FAILURE_KIND", "rejected")])).expect("env");

    let failure = settings.failure.expect("failure configured");
    assert_eq!(failure.kind, AuthErrorKind::Rejected);
    assert_eq!(failure.message, "server said no");
}

#[test]
fn invalid_env_values_are_reported() {
    let mut settings = Settings::default();
    assert!(apply_env(&mut settings, env_of(&[("APP__SIGNED_IN", "maybe")])).is_err());
    assert!(apply_env(&mut settings, env_of(&[("APP__FAILURE_KIND", "flaky")])).is_err());
    assert!(apply_env(&mut settings, env_of(&[("APP__OUTPUT", "xml")])).is_err());
}
