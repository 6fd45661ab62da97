use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AssistantError, Result, TEXT_MISSING};
use crate::modes::{Mode, ModeKind, PlanTier, ordered_modes};

/// Validated transform request, built from a loosely parsed JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub text: String,
    pub mode: Mode,
}

impl TransformRequest {
    /// Parse a raw body. Undecodable JSON is treated as an empty object so the
    /// caller gets the missing-field error instead of a parse error.
    pub fn from_body(body: &[u8], max_chars: usize) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!("Request body is not valid JSON ({}), treating as empty", e);
            Value::Object(Default::default())
        });
        Self::from_value(&value, max_chars)
    }

    pub fn from_value(value: &Value, max_chars: usize) -> Result<Self> {
        // `texto`/`modo` are the Spanish field names the web client sends
        let text = value
            .get("text")
            .or_else(|| value.get("texto"))
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AssistantError::Validation(TEXT_MISSING.to_string()))?;

        let length = text.chars().count();
        if length > max_chars {
            return Err(AssistantError::Validation(format!(
                "text field too long: {length} characters (maximum {max_chars})"
            )));
        }

        let raw_mode = value
            .get("mode")
            .or_else(|| value.get("modo"))
            .and_then(Value::as_str);
        let mode = Mode::resolve(raw_mode);
        if let Some(raw) = raw_mode.filter(|raw| raw.parse::<Mode>().is_err()) {
            tracing::debug!("Unrecognized mode '{}', falling back to '{}'", raw, mode);
        }

        Ok(Self {
            text: text.to_string(),
            mode,
        })
    }
}

/// Success body. `resultado` carries the same text for the web client, which
/// reads the Spanish field name.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransformResponse {
    pub result: String,
    pub resultado: String,
}

impl TransformResponse {
    pub fn new(result: String) -> Self {
        Self {
            resultado: result.clone(),
            result,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: String,
    pub time: String,
}

// Catalog published for client-side plan gating
#[derive(Debug, Serialize)]
pub struct ModeInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ModeKind,
    pub minimum_plan: PlanTier,
}

#[derive(Debug, Serialize)]
pub struct PlanInfo {
    pub tier: PlanTier,
    pub modes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub default_mode: Mode,
    pub modes: Vec<ModeInfo>,
    pub plans: Vec<PlanInfo>,
}

impl Catalog {
    pub fn build() -> Self {
        let modes = Mode::ALL
            .into_iter()
            .map(|m| ModeInfo {
                id: m.id(),
                label: m.label(),
                kind: m.kind(),
                minimum_plan: PlanTier::minimum_for(m),
            })
            .collect();
        let plans = PlanTier::ALL
            .into_iter()
            .map(|tier| PlanInfo {
                tier,
                modes: ordered_modes(tier.modes()).map(|m| m.id()).collect(),
            })
            .collect();
        Self {
            default_mode: Mode::default(),
            modes,
            plans,
        }
    }
}

// Chat message format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

// Chat completions request format
#[derive(Debug, Serialize, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// Responses API request format
#[derive(Debug, Serialize, Clone)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// Chat completions response format; every level is optional so odd shapes still decode
#[derive(Debug, Deserialize, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

// Responses API response format
#[derive(Debug, Deserialize, Default)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<String>,
}
