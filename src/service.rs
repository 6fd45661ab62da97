use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AssistantError, CREDENTIAL_MISSING, INTERNAL, Result};
use crate::models::{ErrorBody, TransformRequest, TransformResponse};
use crate::prompt::build_prompt;
use crate::response::UNREADABLE_OUTPUT;
use crate::transport::{ProviderRequest, Transport};

/// Where the provider credential comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read `provider.api_key_env` from the process environment on every request
    Environment,
    Fixed(Option<String>),
}

/// Request pipeline: validate, check credential, build prompt, call provider, normalize.
#[derive(Clone)]
pub struct AssistantService {
    transport: Arc<dyn Transport>,
    config: Arc<Config>,
    credentials: CredentialSource,
}

impl AssistantService {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: Arc<Config>,
        credentials: CredentialSource,
    ) -> Self {
        let service = Self {
            transport,
            config,
            credentials,
        };
        // Missing keys only fail requests, the server still starts
        if service.transport.requires_credential() && service.credential().is_none() {
            tracing::warn!(
                env = %service.config.provider.api_key_env,
                "Provider credential is not set; transform requests will fail until it is configured"
            );
        }
        service
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.transport.name()
    }

    fn credential(&self) -> Option<String> {
        match &self.credentials {
            CredentialSource::Environment => self.config.provider_credential(),
            CredentialSource::Fixed(key) => key.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    /// Run one validated request through the provider.
    pub async fn transform(&self, request: TransformRequest) -> Result<String> {
        let credential = if self.transport.requires_credential() {
            match self.credential() {
                Some(key) => Some(key),
                None => {
                    tracing::error!(
                        env = %self.config.provider.api_key_env,
                        "Provider credential is not set in the environment"
                    );
                    return Err(AssistantError::Configuration(CREDENTIAL_MISSING.to_string()));
                }
            }
        } else {
            None
        };

        let prompt = build_prompt(&request.text, request.mode);
        let call = self.transport.complete(ProviderRequest { credential, prompt });

        let output = tokio::time::timeout(self.config.provider_timeout(), call)
            .await
            .map_err(|_| AssistantError::Timeout(self.config.provider.timeout_seconds))??;

        Ok(output.unwrap_or_else(|| {
            tracing::warn!(mode = %request.mode, "Returning placeholder for unreadable provider output");
            UNREADABLE_OUTPUT.to_string()
        }))
    }

    /// Full handling of a raw request body into a status and JSON envelope.
    pub async fn handle(&self, body: &[u8]) -> (StatusCode, Value) {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("transform", %request_id, mode = tracing::field::Empty);
        let started = Instant::now();

        async {
            let outcome = match TransformRequest::from_body(body, self.config.limits.max_text_chars) {
                Ok(request) => {
                    tracing::Span::current().record("mode", tracing::field::display(request.mode));
                    self.transform(request).await
                }
                Err(e) => Err(e),
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match outcome {
                Ok(result) => {
                    tracing::info!(elapsed_ms, "Transform completed");
                    (StatusCode::OK, to_json(&TransformResponse::new(result)))
                }
                Err(e) => self.error_envelope(e, elapsed_ms),
            }
        }
        .instrument(span)
        .await
    }

    /// Envelope for a request refused before its body could be read.
    pub fn reject(&self, e: AssistantError) -> (StatusCode, Value) {
        self.error_envelope(e, 0)
    }

    fn error_envelope(&self, e: AssistantError, elapsed_ms: u64) -> (StatusCode, Value) {
        let status = e.status();
        if status.is_client_error() {
            tracing::warn!(elapsed_ms, error = %e, "Rejected transform request");
        } else {
            tracing::error!(elapsed_ms, error = %e, "Transform request failed");
        }
        let detail = (self.config.server.expose_error_details && !e.is_pre_flight())
            .then(|| e.to_string());
        let body = ErrorBody {
            error: e.public_message(),
            detail,
        };
        (status, to_json(&body))
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize response body: {}", e);
        json!({ "error": INTERNAL })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QUOTA_EXCEEDED, TEXT_MISSING};
    use crate::modes::Mode;
    use crate::transport::MockTransport;
    use mockall::predicate;

    fn service(mock: MockTransport, key: Option<&str>) -> AssistantService {
        service_with(mock, key, Config::default())
    }

    fn service_with(mock: MockTransport, key: Option<&str>, config: Config) -> AssistantService {
        AssistantService::new(
            Arc::new(mock),
            Arc::new(config),
            CredentialSource::Fixed(key.map(str::to_string)),
        )
    }

    fn remote_mock() -> MockTransport {
        let mut mock = MockTransport::new();
        mock.expect_requires_credential().return_const(true);
        mock.expect_name().return_const("mock");
        mock
    }

    #[tokio::test]
    async fn corrects_text_end_to_end() {
        let mut mock = remote_mock();
        mock.expect_complete()
            .withf(|req| {
                req.credential.as_deref() == Some("sk-test")
                    && req.prompt.mode == Mode::Correct
                    && req.prompt.instruction().contains("este es un texto con eror")
            })
            .times(1)
            .returning(|_| Ok(Some("Este es un texto con error.".to_string())));

        let svc = service(mock, Some("sk-test"));
        let (status, body) = svc
            .handle(br#"{"text": "este es un texto con eror", "mode": "corregir"}"#)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "result": "Este es un texto con error.",
                "resultado": "Este es un texto con error."
            })
        );
    }

    #[tokio::test]
    async fn missing_text_is_rejected_before_provider() {
        let mut mock = remote_mock();
        mock.expect_complete().never();
        let svc = service(mock, Some("sk-test"));

        let (status, body) = svc.handle(br#"{"mode": "resumir"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], TEXT_MISSING);
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn whitespace_text_is_rejected() {
        let mut mock = remote_mock();
        mock.expect_complete().never();
        let svc = service(mock, Some("sk-test"));
        let (status, _) = svc.handle(br#"{"text": "   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_credential_is_a_server_error() {
        let mut mock = remote_mock();
        mock.expect_complete().never();
        let svc = service(mock, None);

        let (status, body) = svc.handle(br#"{"text": "hola"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], CREDENTIAL_MISSING);
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn blank_credential_counts_as_missing() {
        let mut mock = remote_mock();
        mock.expect_complete().never();
        let svc = service(mock, Some("  "));
        let (status, _) = svc.handle(br#"{"text": "hola"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn provider_failure_is_generic() {
        let mut mock = remote_mock();
        mock.expect_complete()
            .returning(|_| Err(AssistantError::Provider("connection reset by peer".to_string())));
        let svc = service(mock, Some("sk-test"));

        let (status, body) = svc.handle(br#"{"text": "hola"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL);
        assert!(body.get("detail").is_none());
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn rate_limit_gets_specific_message() {
        let mut mock = remote_mock();
        mock.expect_complete()
            .returning(|_| Err(AssistantError::RateLimited("429".to_string())));
        let svc = service(mock, Some("sk-test"));

        let (status, body) = svc.handle(br#"{"text": "hola"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], QUOTA_EXCEEDED);
    }

    #[tokio::test]
    async fn detail_is_exposed_only_when_configured() {
        let mut mock = remote_mock();
        mock.expect_complete()
            .returning(|_| Err(AssistantError::Provider("upstream 502".to_string())));
        let mut config = Config::default();
        config.server.expose_error_details = true;
        let svc = service_with(mock, Some("sk-test"), config);

        let (_, body) = svc.handle(br#"{"text": "hola"}"#).await;
        assert_eq!(body["error"], INTERNAL);
        assert!(body["detail"].as_str().unwrap().contains("upstream 502"));
    }

    #[tokio::test]
    async fn unreadable_output_becomes_placeholder() {
        let mut mock = remote_mock();
        mock.expect_complete().returning(|_| Ok(None));
        let svc = service(mock, Some("sk-test"));

        let (status, body) = svc.handle(br#"{"text": "hola"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], UNREADABLE_OUTPUT);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn unknown_mode_behaves_like_default() {
        let mut mock = remote_mock();
        mock.expect_complete()
            .withf(|req| req.prompt == build_prompt("hola", Mode::Correct))
            .times(2)
            .returning(|_| Ok(Some("Hola.".to_string())));
        let svc = service(mock, Some("sk-test"));

        let unknown = svc.handle(br#"{"text": "hola", "mode": "traducir"}"#).await;
        let default = svc.handle(br#"{"text": "hola", "mode": "corregir"}"#).await;
        assert_eq!(unknown, default);
    }

    #[tokio::test]
    async fn local_transport_needs_no_credential() {
        let mut mock = MockTransport::new();
        mock.expect_requires_credential().return_const(false);
        mock.expect_complete()
            .with(predicate::function(|req: &ProviderRequest| req.credential.is_none()))
            .returning(|req| Ok(Some(req.prompt.text)));
        let svc = service(mock, None);

        let (status, body) = svc.handle(br#"{"texto": "sin cambios", "modo": "mejorar"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "sin cambios");
    }

    #[test]
    fn rejected_body_uses_error_envelope() {
        let mut mock = remote_mock();
        mock.expect_complete().never();
        let mut config = Config::default();
        config.server.expose_error_details = true;
        let svc = service_with(mock, Some("sk-test"), config);

        let (status, body) = svc.reject(AssistantError::Validation("text field too long".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "text field too long"}));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        struct Slow;

        #[async_trait::async_trait]
        impl Transport for Slow {
            fn name(&self) -> &'static str {
                "slow"
            }
            fn requires_credential(&self) -> bool {
                false
            }
            async fn complete(&self, _request: ProviderRequest) -> Result<Option<String>> {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                Ok(Some("late".to_string()))
            }
        }

        let mut config = Config::default();
        config.provider.timeout_seconds = 1;
        let svc = AssistantService::new(Arc::new(Slow), Arc::new(config), CredentialSource::Fixed(None));
        let err = svc
            .transform(TransformRequest {
                text: "hola".to_string(),
                mode: Mode::Correct,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Timeout(1)));
    }
}
