use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::config::{ApiStyle, Config, ProviderConfig, ProviderKind};
use crate::error::{AssistantError, CREDENTIAL_MISSING, Result};
use crate::heuristics;
use crate::models::{ChatRequest, ResponsesRequest};
use crate::prompt::PromptSpec;
use crate::response::{extract_chat_output, extract_responses_output};

/// One provider call. The credential is resolved per request by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub credential: Option<String>,
    pub prompt: PromptSpec,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    fn requires_credential(&self) -> bool;

    /// `Ok(None)` means the provider answered but no text could be located.
    async fn complete(&self, request: ProviderRequest) -> Result<Option<String>>;
}

pub fn build_transport(cfg: &Config) -> Result<Arc<dyn Transport>> {
    match cfg.provider.kind {
        ProviderKind::Openai => Ok(Arc::new(OpenAiTransport::new(&cfg.provider)?)),
        ProviderKind::Local => Ok(Arc::new(LocalTransport)),
    }
}

/// OpenAI-compatible HTTP transport. Single attempt, no retries.
pub struct OpenAiTransport {
    client: Client,
    base_url: String,
    model: String,
    api_style: ApiStyle,
    temperature: f32,
    max_output_tokens: Option<u32>,
    timeout_seconds: u64,
}

impl OpenAiTransport {
    pub fn new(cfg: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_style: cfg.api_style,
            temperature: cfg.temperature,
            max_output_tokens: cfg.max_output_tokens,
            timeout_seconds: cfg.timeout_seconds,
        })
    }

    fn endpoint(&self) -> String {
        match self.api_style {
            ApiStyle::Responses => format!("{}/responses", self.base_url),
            ApiStyle::Chat => format!("{}/chat/completions", self.base_url),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> AssistantError {
        if e.is_timeout() {
            AssistantError::Timeout(self.timeout_seconds)
        } else {
            AssistantError::Provider(format!("Failed to send request to provider: {e}"))
        }
    }
}

fn is_quota_error(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || body.contains("insufficient_quota")
        || body.contains("rate_limit_exceeded")
}

#[async_trait]
impl Transport for OpenAiTransport {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn requires_credential(&self) -> bool {
        true
    }

    async fn complete(&self, request: ProviderRequest) -> Result<Option<String>> {
        let credential = request
            .credential
            .ok_or_else(|| AssistantError::Configuration(CREDENTIAL_MISSING.to_string()))?;
        let prompt = request.prompt;

        tracing::debug!(
            mode = %prompt.mode,
            model = %self.model,
            chars = prompt.text.chars().count(),
            "Sending prompt to provider"
        );

        let builder = self.client.post(self.endpoint()).bearer_auth(credential);
        let builder = match self.api_style {
            ApiStyle::Responses => builder.json(&ResponsesRequest {
                model: self.model.clone(),
                input: prompt.instruction(),
                max_output_tokens: self.max_output_tokens,
            }),
            ApiStyle::Chat => builder.json(&ChatRequest {
                model: self.model.clone(),
                messages: prompt.messages(),
                temperature: self.temperature,
                max_tokens: self.max_output_tokens,
            }),
        };

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if is_quota_error(status, &body) {
                return Err(AssistantError::RateLimited(format!("{status}: {body}")));
            }
            return Err(AssistantError::Provider(format!(
                "Provider returned {status}: {body}"
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AssistantError::Timeout(self.timeout_seconds)
            } else {
                AssistantError::Provider(format!("Failed to parse provider response: {e}"))
            }
        })?;

        let output = match self.api_style {
            ApiStyle::Responses => extract_responses_output(&body),
            ApiStyle::Chat => extract_chat_output(&body),
        };
        if output.is_none() {
            tracing::warn!(raw = %body, "Provider response contained no readable text");
        }
        Ok(output)
    }
}

/// Heuristic engine that never leaves the process.
pub struct LocalTransport;

#[async_trait]
impl Transport for LocalTransport {
    fn name(&self) -> &'static str {
        "local"
    }

    fn requires_credential(&self) -> bool {
        false
    }

    async fn complete(&self, request: ProviderRequest) -> Result<Option<String>> {
        let prompt = request.prompt;
        Ok(Some(heuristics::run_local(prompt.mode, &prompt.text)))
    }
}
