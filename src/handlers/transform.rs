use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use serde_json::Value;

use super::AppState;
use crate::error::AssistantError;

/// Largest body accepted on the transform route. Every character of a
/// maximal text may be JSON-escaped as `\uXXXX`, plus room for the envelope.
pub fn body_limit(max_text_chars: usize) -> usize {
    max_text_chars.saturating_mul(6).saturating_add(4096)
}

/// POST handler. The body is taken raw so malformed JSON degrades into the
/// missing-field error instead of axum's own rejection.
pub async fn transform(
    State(service): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = match body {
        Ok(body) => service.handle(&body).await,
        Err(rejection) => {
            let reason = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                format!(
                    "text field too long: request body exceeds {} bytes",
                    body_limit(service.config().limits.max_text_chars)
                )
            } else {
                format!("request body could not be read: {}", rejection.body_text())
            };
            service.reject(AssistantError::Validation(reason))
        }
    };
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_fits_fully_escaped_text() {
        let text = "\u{1}".repeat(100);
        let encoded = serde_json::json!({ "texto": text, "modo": "corregir" }).to_string();
        assert!(encoded.len() <= body_limit(100));
        assert_eq!(body_limit(usize::MAX), usize::MAX);
    }
}
