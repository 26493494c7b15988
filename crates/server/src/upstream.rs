//! Reqwest-backed clients for the remote model and OCR collaborators.
//!
//! Both clients retry transport failures with bounded exponential backoff;
//! content failures (bad payloads, empty extractions) are never retried.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use glidedesk_agent::llm::LlmClient;
use glidedesk_agent::tools::OcrEngine;
use glidedesk_core::config::{LlmConfig, OcrConfig};
use glidedesk_core::ToolError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self { max_retries, ..Self::default() }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Runs `operation`, retrying only retryable failures up to the policy's
/// attempt budget.
pub async fn with_retries<T, F, Fut>(
    service: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, ToolError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ToolError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < policy.max_retries => {
                warn!(
                    event_name = "upstream.retry",
                    service = %service,
                    attempt,
                    max_retries = policy.max_retries,
                    error = %error,
                    "retrying upstream call"
                );
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Gemini `generateContent` client.
pub struct GeminiLlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    retry: RetryPolicy,
}

const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

impl GeminiLlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            api_key: config.api_key.clone().unwrap_or_else(|| String::new().into()),
            retry: RetryPolicy::with_max_retries(config.max_retries),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String, ToolError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose_secret()
        );
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| ToolError::upstream("gemini", error.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::upstream(
                "gemini",
                format!("request failed with status {}", response.status()),
            ));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| ToolError::upstream("gemini", error.to_string()))?;
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ToolError::ExtractionFailed {
                message: "completion payload had no candidate text".to_string(),
                raw_output: Some(payload.to_string()),
            })
    }
}

#[async_trait]
impl LlmClient for GeminiLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let completion =
            with_retries("gemini", &self.retry, || self.generate(prompt)).await?;
        Ok(completion)
    }
}

/// Client for the remote document-text-detection service.
pub struct RemoteOcrEngine {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RemoteOcrEngine {
    pub fn new(base_url: String, config: &OcrConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, base_url, retry: RetryPolicy::with_max_retries(config.max_retries) })
    }

    async fn detect(&self, image: &[u8]) -> Result<String, ToolError> {
        let url = format!("{}/detect_text", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .header("content-type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|error| ToolError::upstream("ocr", error.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::upstream(
                "ocr",
                format!("request failed with status {}", response.status()),
            ));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| ToolError::upstream("ocr", error.to_string()))?;
        payload["full_text"].as_str().map(str::to_string).ok_or_else(|| {
            ToolError::ExtractionFailed {
                message: "detection payload had no full_text field".to_string(),
                raw_output: Some(payload.to_string()),
            }
        })
    }
}

#[async_trait]
impl OcrEngine for RemoteOcrEngine {
    async fn detect_text(&self, image: &[u8]) -> Result<String, ToolError> {
        if image.is_empty() {
            return Err(ToolError::invalid_argument("image", "no image bytes provided"));
        }
        with_retries("ocr", &self.retry, || self.detect(image)).await
    }
}
