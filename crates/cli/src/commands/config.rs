use glidedesk_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        "GLIDEDESK_SERVER_BIND_ADDRESS",
    ));
    lines.push(render_line("server.port", &config.server.port.to_string(), "GLIDEDESK_SERVER_PORT"));
    lines.push(render_line(
        "server.health_check_port",
        &config.server.health_check_port.to_string(),
        "GLIDEDESK_SERVER_HEALTH_CHECK_PORT",
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        "GLIDEDESK_SERVER_GRACEFUL_SHUTDOWN_SECS",
    ));

    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", config.llm.provider).to_ascii_lowercase(),
        "GLIDEDESK_LLM_PROVIDER",
    ));
    lines.push(render_line("llm.model", &config.llm.model, "GLIDEDESK_LLM_MODEL"));
    lines.push(render_line(
        "llm.api_key",
        &redact_secret(config.llm.api_key.as_ref()),
        "GLIDEDESK_LLM_API_KEY",
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        "GLIDEDESK_LLM_TIMEOUT_SECS",
    ));
    lines.push(render_line(
        "llm.max_retries",
        &config.llm.max_retries.to_string(),
        "GLIDEDESK_LLM_MAX_RETRIES",
    ));

    lines.push(render_line(
        "ocr.base_url",
        config.ocr.base_url.as_deref().unwrap_or("unset (fixture engine)"),
        "GLIDEDESK_OCR_BASE_URL",
    ));
    lines.push(render_line(
        "ocr.timeout_secs",
        &config.ocr.timeout_secs.to_string(),
        "GLIDEDESK_OCR_TIMEOUT_SECS",
    ));
    lines.push(render_line(
        "ocr.max_retries",
        &config.ocr.max_retries.to_string(),
        "GLIDEDESK_OCR_MAX_RETRIES",
    ));

    lines.push(render_line("storage.bucket", &config.storage.bucket, "GLIDEDESK_STORAGE_BUCKET"));
    lines.push(render_line(
        "storage.temp_folder",
        &config.storage.temp_folder,
        "GLIDEDESK_STORAGE_TEMP_FOLDER",
    ));

    lines.push(render_line(
        "support.app_name",
        &config.support.app_name,
        "GLIDEDESK_SUPPORT_APP_NAME",
    ));
    lines.push(render_line(
        "support.default_capability",
        &config.support.default_capability,
        "GLIDEDESK_SUPPORT_DEFAULT_CAPABILITY",
    ));
    lines.push(render_line(
        "support.max_package_weight_kg",
        &config.support.max_package_weight_kg.to_string(),
        "GLIDEDESK_SUPPORT_MAX_PACKAGE_WEIGHT_KG",
    ));

    lines.push(render_line("logging.level", &config.logging.level, "GLIDEDESK_LOGGING_LEVEL"));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_ascii_lowercase(),
        "GLIDEDESK_LOGGING_FORMAT",
    ));

    lines.join("\n")
}

fn render_line(key: &str, value: &str, env_var: &str) -> String {
    format!("  {key} = {value}  (env {env_var})")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret {
        Some(secret) if !secret.expose_secret().trim().is_empty() => "********".to_string(),
        _ => "unset".to_string(),
    }
}
