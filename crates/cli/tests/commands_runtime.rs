use std::env;
use std::sync::{Mutex, OnceLock};

use glidedesk_cli::commands::{config, doctor};
use serde_json::Value;

#[test]
fn doctor_json_passes_with_default_config() {
    with_env(&[], || {
        let output = doctor::run(true);
        let payload: Value = serde_json::from_str(&output).expect("doctor emits valid json");

        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks list");
        assert!(checks
            .iter()
            .any(|check| check["name"] == "config_validation" && check["status"] == "pass"));
        assert!(checks
            .iter()
            .any(|check| check["name"] == "support_runtime" && check["status"] == "pass"));
        assert!(checks
            .iter()
            .any(|check| check["name"] == "ocr_endpoint" && check["status"] == "skipped"));
    });
}

#[test]
fn doctor_human_output_summarizes_checks() {
    with_env(&[], || {
        let output = doctor::run(false);
        assert!(output.contains("all readiness checks passed"));
        assert!(output.contains("[pass] support_runtime"));
    });
}

#[test]
fn doctor_fails_on_invalid_default_capability() {
    with_env(&[("GLIDEDESK_SUPPORT_DEFAULT_CAPABILITY", "billing")], || {
        let output = doctor::run(true);
        let payload: Value = serde_json::from_str(&output).expect("doctor emits valid json");

        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks list");
        assert!(checks
            .iter()
            .any(|check| check["name"] == "config_validation" && check["status"] == "fail"));
    });
}

#[test]
fn config_renders_effective_values_with_redaction() {
    with_env(&[("GLIDEDESK_LLM_API_KEY", "super-secret-key")], || {
        let output = config::run();
        assert!(output.contains("support.default_capability = faq"));
        assert!(output.contains("llm.api_key = ********"));
        assert!(!output.contains("super-secret-key"));
    });
}

#[test]
fn config_reports_validation_failures() {
    with_env(&[("GLIDEDESK_LOGGING_LEVEL", "verbose")], || {
        let output = config::run();
        assert!(output.contains("config validation failed"));
        assert!(output.contains("logging.level"));
    });
}

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn with_env(vars: &[(&str, &str)], test: impl FnOnce()) {
    let _guard = env_lock().lock().expect("env lock");
    for (key, value) in vars {
        env::set_var(key, value);
    }
    test();
    for (key, _) in vars {
        env::remove_var(key);
    }
}
