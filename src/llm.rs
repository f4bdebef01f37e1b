//! Chat-completions providers: OpenAI, Groq (free tier) and Ollama (local).
//!
//! All three speak the OpenAI wire format, so one HTTP client covers them;
//! only base URL, key and default model differ. A scripted in-process
//! provider is included for offline runs and tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{PackReviewError, Result};

pub const OPENAI_BASE: &str = "https://api.openai.com/v1";
pub const GROQ_BASE: &str = "https://api.groq.com/openai/v1";
pub const OLLAMA_BASE: &str = "http://localhost:11434/v1";

/// Trait for chat-completion providers
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// One completion: system + user message in, assistant text out
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier recorded in audit events and packet footers
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// HTTP provider for any OpenAI-compatible /chat/completions endpoint
pub struct HttpChat {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpChat {
    pub fn new(base_url: String, api_key: String, model: String, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| PackReviewError::Llm {
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ChatCompletion for HttpChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(
            "chat completion: model={} system={}ch user={}ch",
            self.model,
            system.len(),
            user.len()
        );

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PackReviewError::Llm {
                message: format!("Chat API error: {} - {}", status, error_text),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Deterministic provider that replays a fixed list of replies in order.
/// Used by tests and anywhere a run must not touch the network.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
    model: String,
}

impl ScriptedChat {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            model: "scripted".to_string(),
        }
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        let mut replies = self.replies.lock().map_err(|_| PackReviewError::Llm {
            message: "scripted replies lock poisoned".to_string(),
        })?;
        replies.pop_front().ok_or_else(|| PackReviewError::Llm {
            message: "scripted chat ran out of replies".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create the configured chat provider.
///
/// Key checks happen here, up front, so a misconfigured run fails before any
/// brief text leaves the machine.
pub fn create_chat(config: &Config) -> Result<Arc<dyn ChatCompletion>> {
    let model = config.model();
    let timeout_ms = config.runtime.request_timeout_ms;

    match config.llm.provider.as_str() {
        "groq" => {
            let api_key = config.runtime.groq_api_key.clone().unwrap_or_default();
            if is_placeholder(&api_key) {
                return Err(PackReviewError::Config {
                    message: "Groq API key not set. Set LLM_PROVIDER=groq and \
                              GROQ_API_KEY=your-key in .env (free keys at \
                              https://console.groq.com/)."
                        .to_string(),
                });
            }
            let base_url = config
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| GROQ_BASE.to_string());
            Ok(Arc::new(HttpChat::new(base_url, api_key, model, timeout_ms)?))
        }
        "ollama" => {
            // Local server, no auth; any key satisfies the wire format
            let base_url = config
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| OLLAMA_BASE.to_string());
            Ok(Arc::new(HttpChat::new(
                base_url,
                "ollama".to_string(),
                model,
                timeout_ms,
            )?))
        }
        _ => {
            let api_key = config.runtime.openai_api_key.clone().unwrap_or_default();
            if is_placeholder(&api_key) {
                return Err(PackReviewError::Config {
                    message: "OpenAI API key not set. Put OPENAI_API_KEY=your-key in .env, \
                              or use a free option: LLM_PROVIDER=groq with GROQ_API_KEY, or \
                              LLM_PROVIDER=ollama with a local model (ollama run llama3.2)."
                        .to_string(),
                });
            }
            let base_url = config
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE.to_string());
            Ok(Arc::new(HttpChat::new(base_url, api_key, model, timeout_ms)?))
        }
    }
}

/// Check if an API key is empty or still a template value
fn is_placeholder(key: &str) -> bool {
    let trimmed = key.trim();
    trimmed.is_empty()
        || trimmed.starts_with("sk-REPLACE")
        || trimmed.starts_with("gsk_REPLACE")
        || trimmed.contains("${")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("   "));
        assert!(is_placeholder("sk-REPLACE_ME"));
        assert!(is_placeholder("gsk_REPLACE_ME"));
        assert!(is_placeholder("${OPENAI_API_KEY}"));
        assert!(!is_placeholder("sk-proj-abc123"));
        assert!(!is_placeholder("gsk_abc123"));
    }

    #[tokio::test]
    async fn scripted_chat_replays_in_order() {
        let chat = ScriptedChat::new(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(chat.complete("s", "u").await.unwrap(), "first");
        assert_eq!(chat.complete("s", "u").await.unwrap(), "second");
        let err = chat.complete("s", "u").await.unwrap_err();
        assert!(err.to_string().contains("ran out of replies"));
    }

    #[test]
    fn missing_openai_key_is_a_config_error() {
        let mut config = Config::default();
        config.runtime.openai_api_key = Some("sk-REPLACE_WITH_REAL_KEY".to_string());
        let err = match create_chat(&config) {
            Err(e) => e,
            Ok(_) => panic!("expected config error"),
        };
        assert!(err.to_string().contains("OpenAI API key not set"));
    }

    #[test]
    fn ollama_needs_no_key() {
        let mut config = Config::default();
        config.llm.provider = "ollama".to_string();
        let chat = create_chat(&config).unwrap();
        assert_eq!(chat.model_name(), "llama3.2");
    }
}
