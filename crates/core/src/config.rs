use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::capability::CapabilityName;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub ocr: OcrConfig,
    pub storage: StorageConfig,
    pub support: SupportConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub health_check_port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Remote OCR service. When `base_url` is absent the runtime falls back to
/// the deterministic fixture engine.
#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    pub temp_folder: String,
}

#[derive(Clone, Debug)]
pub struct SupportConfig {
    pub app_name: String,
    pub default_capability: String,
    pub max_package_weight_kg: f64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Noop,
    Gemini,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub ocr_base_url: Option<String>,
    pub default_capability: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                health_check_port: 8080,
                graceful_shutdown_secs: 15,
            },
            llm: LlmConfig {
                provider: LlmProvider::Noop,
                api_key: None,
                base_url: None,
                model: "gemini-2.5-pro".to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
            ocr: OcrConfig { base_url: None, timeout_secs: 30, max_retries: 2 },
            storage: StorageConfig {
                bucket: "logistics-customer-support".to_string(),
                temp_folder: "image_temp".to_string(),
            },
            support: SupportConfig {
                app_name: "logistics-customer-support".to_string(),
                default_capability: "faq".to_string(),
                max_package_weight_kg: 45.0,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "noop" => Ok(Self::Noop),
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected noop|gemini)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("glidedesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(health_check_port) = server.health_check_port {
                self.server.health_check_port = health_check_port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
        }

        if let Some(ocr) = patch.ocr {
            if let Some(base_url) = ocr.base_url {
                self.ocr.base_url = Some(base_url);
            }
            if let Some(timeout_secs) = ocr.timeout_secs {
                self.ocr.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = ocr.max_retries {
                self.ocr.max_retries = max_retries;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(bucket) = storage.bucket {
                self.storage.bucket = bucket;
            }
            if let Some(temp_folder) = storage.temp_folder {
                self.storage.temp_folder = temp_folder;
            }
        }

        if let Some(support) = patch.support {
            if let Some(app_name) = support.app_name {
                self.support.app_name = app_name;
            }
            if let Some(default_capability) = support.default_capability {
                self.support.default_capability = default_capability;
            }
            if let Some(max_package_weight_kg) = support.max_package_weight_kg {
                self.support.max_package_weight_kg = max_package_weight_kg;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("GLIDEDESK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("GLIDEDESK_SERVER_PORT") {
            self.server.port = parse_u16("GLIDEDESK_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("GLIDEDESK_SERVER_HEALTH_CHECK_PORT") {
            self.server.health_check_port =
                parse_u16("GLIDEDESK_SERVER_HEALTH_CHECK_PORT", &value)?;
        }
        if let Some(value) = read_env("GLIDEDESK_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("GLIDEDESK_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("GLIDEDESK_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("GLIDEDESK_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("GLIDEDESK_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("GLIDEDESK_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("GLIDEDESK_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("GLIDEDESK_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("GLIDEDESK_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("GLIDEDESK_LLM_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("GLIDEDESK_OCR_BASE_URL") {
            self.ocr.base_url = Some(value);
        }
        if let Some(value) = read_env("GLIDEDESK_OCR_TIMEOUT_SECS") {
            self.ocr.timeout_secs = parse_u64("GLIDEDESK_OCR_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("GLIDEDESK_OCR_MAX_RETRIES") {
            self.ocr.max_retries = parse_u32("GLIDEDESK_OCR_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("GLIDEDESK_STORAGE_BUCKET") {
            self.storage.bucket = value;
        }
        if let Some(value) = read_env("GLIDEDESK_STORAGE_TEMP_FOLDER") {
            self.storage.temp_folder = value;
        }

        if let Some(value) = read_env("GLIDEDESK_SUPPORT_APP_NAME") {
            self.support.app_name = value;
        }
        if let Some(value) = read_env("GLIDEDESK_SUPPORT_DEFAULT_CAPABILITY") {
            self.support.default_capability = value;
        }
        if let Some(value) = read_env("GLIDEDESK_SUPPORT_MAX_PACKAGE_WEIGHT_KG") {
            self.support.max_package_weight_kg =
                parse_f64("GLIDEDESK_SUPPORT_MAX_PACKAGE_WEIGHT_KG", &value)?;
        }

        let log_level =
            read_env("GLIDEDESK_LOGGING_LEVEL").or_else(|| read_env("GLIDEDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GLIDEDESK_LOGGING_FORMAT").or_else(|| read_env("GLIDEDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(ocr_base_url) = overrides.ocr_base_url {
            self.ocr.base_url = Some(ocr_base_url);
        }
        if let Some(default_capability) = overrides.default_capability {
            self.support.default_capability = default_capability;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_llm(&self.llm)?;
        validate_ocr(&self.ocr)?;
        validate_storage(&self.storage)?;
        validate_support(&self.support)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("glidedesk.toml"), PathBuf::from("config/glidedesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must be non-empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be greater than zero".to_string(),
        ));
    }
    if server.health_check_port == 0 {
        return Err(ConfigError::Validation(
            "server.health_check_port must be greater than zero".to_string(),
        ));
    }
    if server.port == server.health_check_port {
        return Err(ConfigError::Validation(
            "server.health_check_port must differ from server.port".to_string(),
        ));
    }
    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if llm.max_retries > 10 {
        return Err(ConfigError::Validation("llm.max_retries must be at most 10".to_string()));
    }

    if llm.provider == LlmProvider::Gemini {
        let missing = llm
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(
                "llm.api_key is required for the gemini provider".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_ocr(ocr: &OcrConfig) -> Result<(), ConfigError> {
    if let Some(base_url) = &ocr.base_url {
        let well_formed = base_url.starts_with("http://") || base_url.starts_with("https://");
        if !well_formed {
            return Err(ConfigError::Validation(
                "ocr.base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    if ocr.timeout_secs == 0 || ocr.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "ocr.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if ocr.max_retries > 10 {
        return Err(ConfigError::Validation("ocr.max_retries must be at most 10".to_string()));
    }

    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.bucket.trim().is_empty() {
        return Err(ConfigError::Validation("storage.bucket must be non-empty".to_string()));
    }
    if storage.temp_folder.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage.temp_folder must be non-empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_support(support: &SupportConfig) -> Result<(), ConfigError> {
    if support.app_name.trim().is_empty() {
        return Err(ConfigError::Validation("support.app_name must be non-empty".to_string()));
    }
    if support.default_capability.parse::<CapabilityName>().is_err() {
        return Err(ConfigError::Validation(format!(
            "support.default_capability `{}` is not a known capability",
            support.default_capability
        )));
    }
    if !(support.max_package_weight_kg > 0.0 && support.max_package_weight_kg <= 1000.0) {
        return Err(ConfigError::Validation(
            "support.max_package_weight_kg must be in range (0, 1000]".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    llm: Option<LlmPatch>,
    ocr: Option<OcrPatch>,
    storage: Option<StoragePatch>,
    support: Option<SupportPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    health_check_port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    bucket: Option<String>,
    temp_folder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SupportPatch {
    app_name: Option<String>,
    default_capability: Option<String>,
    max_package_weight_kg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
