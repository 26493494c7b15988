use std::sync::Arc;

use glidedesk_agent::llm::{LlmClient, NoopLlmClient};
use glidedesk_agent::session::InMemorySessionStore;
use glidedesk_agent::storage::InMemoryBlobStore;
use glidedesk_agent::tools::{FixtureOcrEngine, OcrEngine};
use glidedesk_agent::{build_runtime, BuildError, RuntimeDeps, SupportRuntime};
use glidedesk_core::config::{AppConfig, ConfigError, LlmProvider, LoadOptions};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<SupportRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("support runtime construction failed: {0}")]
    Runtime(#[from] BuildError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Builds the whole application from an already-loaded config. Collaborator
/// selection happens here: remote clients when configured, in-process
/// fixtures otherwise. Any construction failure aborts startup.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let llm: Arc<dyn LlmClient> = match config.llm.provider {
        LlmProvider::Noop => Arc::new(NoopLlmClient),
        LlmProvider::Gemini => {
            Arc::new(crate::upstream::GeminiLlmClient::from_config(&config.llm)?)
        }
    };

    let ocr: Arc<dyn OcrEngine> = match &config.ocr.base_url {
        Some(base_url) => {
            Arc::new(crate::upstream::RemoteOcrEngine::new(base_url.clone(), &config.ocr)?)
        }
        None => Arc::new(FixtureOcrEngine),
    };

    let deps = RuntimeDeps {
        llm,
        ocr,
        blobs: Arc::new(InMemoryBlobStore::new(
            config.storage.bucket.clone(),
            config.storage.temp_folder.clone(),
        )),
        sessions: Arc::new(InMemorySessionStore::default()),
    };

    let runtime = build_runtime(&config, deps)?;
    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        llm_provider = ?config.llm.provider,
        remote_ocr = config.ocr.base_url.is_some(),
        "support runtime ready"
    );

    Ok(Application { config, runtime: Arc::new(runtime) })
}

#[cfg(test)]
mod tests {
    use glidedesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use glidedesk_core::CapabilityName;

    use super::{bootstrap, bootstrap_with_config, BootstrapError};

    #[test]
    fn bootstrap_fails_fast_on_invalid_config() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                default_capability: Some("billing".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("startup error").to_string();
        assert!(message.contains("support.default_capability"));
    }

    #[test]
    fn bootstrap_builds_a_full_registry_from_defaults() {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap succeeds");
        assert_eq!(app.runtime.orchestrator.capabilities(), CapabilityName::ALL.to_vec());
        assert_eq!(app.runtime.tools.len(), 5);
    }

    #[test]
    fn gemini_without_api_key_fails_at_load() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                llm_provider: Some(glidedesk_core::config::LlmProvider::Gemini),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });
        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }
}
