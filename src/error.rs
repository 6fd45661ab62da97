use axum::http::StatusCode;
use thiserror::Error;

pub const TEXT_MISSING: &str = "text field missing";
pub const CREDENTIAL_MISSING: &str = "provider credential not configured";
pub const INTERNAL: &str = "internal error processing request";
pub const QUOTA_EXCEEDED: &str = "the AI provider rejected the request for rate limit or quota reasons; check the billing and usage limits of the configured API key";

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("Provider timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

}

impl AssistantError {
    pub fn status(&self) -> StatusCode {
        match self {
            AssistantError::Validation(_) => StatusCode::BAD_REQUEST,
            AssistantError::Configuration(_)
            | AssistantError::Provider(_)
            | AssistantError::RateLimited(_)
            | AssistantError::Timeout(_)
            | AssistantError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller. Provider internals stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AssistantError::Validation(msg) | AssistantError::Configuration(msg) => msg.clone(),
            AssistantError::RateLimited(_) => QUOTA_EXCEEDED.to_string(),
            _ => INTERNAL.to_string(),
        }
    }

    /// Whether the failure was caught before any provider call was attempted.
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            AssistantError::Validation(_) | AssistantError::Configuration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AssistantError::Validation(TEXT_MISSING.to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), TEXT_MISSING);
        assert!(err.is_pre_flight());
    }

    #[test]
    fn provider_details_are_not_public() {
        let err = AssistantError::Provider("upstream said: secret stack".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL);
        assert!(!err.is_pre_flight());
    }

    #[test]
    fn rate_limit_points_to_quota() {
        let err = AssistantError::RateLimited("429".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.public_message().contains("quota"));
    }

    #[test]
    fn configuration_message_is_public() {
        let err = AssistantError::Configuration(CREDENTIAL_MISSING.to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), CREDENTIAL_MISSING);
    }
}
