use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the assistant service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub route: String,
    /// Adds the error's display text to 500 responses. Debug deployments only.
    pub expose_error_details: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Openai,
    Local,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApiStyle {
    Responses,
    Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_style: ApiStyle,
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_text_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            route: "/api/ai".to_string(),
            expose_error_details: false,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Openai,
            api_style: ApiStyle::Responses,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 60,
            temperature: 0.3,
            max_output_tokens: None,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 20_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        let env_paths = ["../.env", ".env"];

        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }

        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("ASSISTANT_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = Self::from_file(&config_path);
        config.apply_overrides(|key| env::var(key).ok());

        // Unusable values fall back to their defaults - log but don't fail
        for fallback in config.apply_fallbacks() {
            tracing::warn!("Invalid config value: {}", fallback);
        }

        config
    }

    fn from_file(config_path: &str) -> Self {
        if !Path::new(config_path).exists() {
            tracing::warn!("Config file not found at {} - using defaults", config_path);
            return Self::default();
        }
        match fs::read_to_string(config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path);
                    config
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to parse config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!(
                    "Failed to read config file {}: {} - using defaults",
                    config_path,
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(bind) = lookup("ASSISTANT_HTTP_BIND") {
            self.server.bind = bind;
        }
        if let Some(route) = lookup("ASSISTANT_HTTP_PATH") {
            self.server.route = route;
        }
        if let Some(expose) = lookup("ASSISTANT_EXPOSE_ERROR_DETAILS") {
            if let Ok(v) = expose.parse() {
                self.server.expose_error_details = v;
            }
        }

        // Provider overrides
        if let Some(kind) = lookup("ASSISTANT_PROVIDER") {
            match kind.to_lowercase().as_str() {
                "openai" => self.provider.kind = ProviderKind::Openai,
                "local" => self.provider.kind = ProviderKind::Local,
                other => tracing::warn!("Unknown ASSISTANT_PROVIDER '{}', keeping {:?}", other, self.provider.kind),
            }
        }
        if let Some(style) = lookup("ASSISTANT_API_STYLE") {
            match style.to_lowercase().as_str() {
                "responses" => self.provider.api_style = ApiStyle::Responses,
                "chat" => self.provider.api_style = ApiStyle::Chat,
                other => tracing::warn!("Unknown ASSISTANT_API_STYLE '{}', keeping {:?}", other, self.provider.api_style),
            }
        }
        if let Some(base_url) = lookup("ASSISTANT_PROVIDER_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Some(model) = lookup("ASSISTANT_MODEL") {
            self.provider.model = model;
        }
        if let Some(key_env) = lookup("ASSISTANT_API_KEY_ENV") {
            self.provider.api_key_env = key_env;
        }
        if let Some(timeout) = lookup("ASSISTANT_PROVIDER_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.provider.timeout_seconds = secs;
            }
        }

        // Limit overrides
        if let Some(max) = lookup("ASSISTANT_MAX_TEXT_CHARS") {
            if let Ok(max_chars) = max.parse() {
                self.limits.max_text_chars = max_chars;
            }
        }
    }

    /// Reset every value the server cannot run with to its default.
    /// Returns one description per replaced value.
    pub fn apply_fallbacks(&mut self) -> Vec<String> {
        let server = ServerConfig::default();
        let provider = ProviderConfig::default();
        let limits = LimitsConfig::default();
        let mut replaced = Vec::new();

        if self.server.bind.parse::<SocketAddr>().is_err() {
            replaced.push(format!(
                "server.bind '{}' is not a socket address, using {}",
                self.server.bind, server.bind
            ));
            self.server.bind = server.bind;
        }
        if !self.server.route.starts_with('/')
            || self.server.route == "/health"
            || self.server.route == "/api/modes"
        {
            replaced.push(format!(
                "server.route '{}' must start with '/' and not collide with a built-in route, using {}",
                self.server.route, server.route
            ));
            self.server.route = server.route;
        }
        if self.provider.timeout_seconds == 0 {
            replaced.push(format!(
                "provider.timeout_seconds cannot be 0, using {}",
                provider.timeout_seconds
            ));
            self.provider.timeout_seconds = provider.timeout_seconds;
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            replaced.push(format!(
                "provider.temperature {} is outside 0.0..=2.0, using {}",
                self.provider.temperature, provider.temperature
            ));
            self.provider.temperature = provider.temperature;
        }
        if self.provider.kind == ProviderKind::Openai && self.provider.model.trim().is_empty() {
            replaced.push(format!("provider.model cannot be empty, using {}", provider.model));
            self.provider.model = provider.model;
        }
        if self.limits.max_text_chars == 0 {
            replaced.push(format!(
                "limits.max_text_chars cannot be 0, using {}",
                limits.max_text_chars
            ));
            self.limits.max_text_chars = limits.max_text_chars;
        }
        replaced
    }

    /// Get provider timeout as Duration
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_seconds)
    }

    /// Read the provider credential at call time. Never cached.
    pub fn provider_credential(&self) -> Option<String> {
        env::var(&self.provider.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
