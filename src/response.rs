//! Locating the generated text inside a provider's response body.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{ChatResponse, ResponsesResponse};

/// Returned in place of the output when the provider answers with an unexpected shape.
pub const UNREADABLE_OUTPUT: &str = "No se pudo leer la respuesta del modelo.";

/// Responses API: the first content part of the first output item, when it is `output_text`.
pub fn extract_responses_output(body: &Value) -> Option<String> {
    let parsed: ResponsesResponse = lenient(body);
    let first = parsed.output.first()?.content.first()?;
    match (first.kind.as_deref(), first.text.as_ref()) {
        (Some("output_text"), Some(text)) => Some(text.clone()),
        _ => None,
    }
}

/// Chat completions: `choices[0].message.content`.
pub fn extract_chat_output(body: &Value) -> Option<String> {
    let parsed: ChatResponse = lenient(body);
    parsed.choices.into_iter().next()?.message?.content
}

fn lenient<T: DeserializeOwned + Default>(body: &Value) -> T {
    serde_json::from_value(body.clone()).unwrap_or_else(|e| {
        tracing::debug!("Provider response did not match the expected shape: {}", e);
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn responses_output_text_is_extracted() {
        let body = json!({
            "id": "resp_1",
            "output": [{
                "type": "message",
                "content": [{"type": "output_text", "text": "Este es un texto con error.", "annotations": []}]
            }]
        });
        assert_eq!(
            extract_responses_output(&body).as_deref(),
            Some("Este es un texto con error.")
        );
    }

    #[test]
    fn responses_non_text_part_is_unreadable() {
        let body = json!({"output": [{"content": [{"type": "refusal", "refusal": "no"}]}]});
        assert_eq!(extract_responses_output(&body), None);
    }

    #[test]
    fn responses_missing_output_is_unreadable() {
        assert_eq!(extract_responses_output(&json!({"status": "failed"})), None);
        assert_eq!(extract_responses_output(&json!({"output": []})), None);
        assert_eq!(extract_responses_output(&json!({"output": "weird"})), None);
        assert_eq!(extract_responses_output(&json!({"output": [{"type": "reasoning"}]})), None);
    }

    #[test]
    fn chat_content_is_extracted() {
        let body = json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Resumen."}}]
        });
        assert_eq!(extract_chat_output(&body).as_deref(), Some("Resumen."));
    }

    #[test]
    fn chat_missing_content_is_unreadable() {
        assert_eq!(extract_chat_output(&json!({"choices": []})), None);
        assert_eq!(
            extract_chat_output(&json!({"choices": [{"message": {"role": "assistant", "content": null}}]})),
            None
        );
        assert_eq!(extract_chat_output(&json!(null)), None);
    }
}
