//! Configuration loaded from packreview.toml and environment variables.

use serde::{Deserialize, Serialize};

/// Main configuration structure loaded from packreview.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub output: OutputConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Chat-provider selection and prompt versioning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// One of "openai", "groq", "ollama"; anything else falls back to openai
    pub provider: String,
    /// Model override; None picks the provider default
    pub model: Option<String>,
    /// Base URL override for self-hosted OpenAI-compatible gateways
    pub base_url: Option<String>,
    /// Recorded in packet footers and audit events so outputs stay traceable
    pub prompt_version: String,
}

/// Where per-run artifact folders are created
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_dir: String,
}

/// Runtime configuration from environment variables (never serialized)
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            base_url: None,
            prompt_version: "packet-draft-001".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: "outputs".to_string(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            groq_api_key: None,
            request_timeout_ms: 60_000,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            groq_api_key: std::env::var("GROQ_API_KEY").ok(),
            request_timeout_ms: std::env::var("PACKREVIEW_HTTP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
        }
    }
}

impl Config {
    /// Load configuration: packreview.toml, then environment overrides.
    /// Call [`crate::load_env`] beforehand to pick up a `.env` file.
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("PACKREVIEW_CONFIG").unwrap_or_else(|_| "packreview.toml".to_string());

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(_) => {
                tracing::debug!("No config file at {}, using defaults", config_path);
                Config::default()
            }
        };

        // Environment variables win over the file
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        config.llm.provider = normalize_provider(&config.llm.provider);

        let model_var = match config.llm.provider.as_str() {
            "groq" => "GROQ_MODEL",
            "ollama" => "OLLAMA_MODEL",
            _ => "OPENAI_MODEL",
        };
        if let Ok(model) = std::env::var(model_var) {
            config.llm.model = Some(model);
        }

        if let Ok(version) = std::env::var("PROMPT_VERSION") {
            config.llm.prompt_version = version;
        }

        config.runtime = RuntimeConfig::load_from_env();

        Ok(config)
    }

    /// Effective model name for the configured provider
    pub fn model(&self) -> String {
        match &self.llm.model {
            Some(model) if !model.trim().is_empty() => model.clone(),
            _ => default_model_for(&self.llm.provider).to_string(),
        }
    }
}

/// Lowercase/trim the provider name; unknown values fall back to openai
fn normalize_provider(raw: &str) -> String {
    let provider = raw.trim().to_lowercase();
    match provider.as_str() {
        "openai" | "groq" | "ollama" => provider,
        other => {
            tracing::warn!("Unknown LLM provider '{}', falling back to openai", other);
            "openai".to_string()
        }
    }
}

pub(crate) fn default_model_for(provider: &str) -> &'static str {
    match provider {
        "groq" => "llama-3.1-8b-instant",
        "ollama" => "llama3.2",
        _ => "gpt-4o-mini",
    }
}
