//! Completion provider implementations.
//!
//! - **[`DisabledCompleter`]**: returns errors; used when no model is configured.
//! - **[`OpenAICompleter`]**: any OpenAI-compatible `/chat/completions`
//!   endpoint. Defaults to Groq's API with `llama-3.1-8b-instant`.
//! - **[`OllamaCompleter`]**: a local Ollama instance's `/api/chat`.
//!
//! Each provider sends the assembled prompt as a single `user` message and
//! returns the first response message verbatim.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use pocket_rag_core::completion::CompletionProvider;

use crate::config::CompletionConfig;
use crate::embedding::{http_client, send_with_retry};

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub struct DisabledCompleter;

#[async_trait]
impl CompletionProvider for DisabledCompleter {
    fn model_name(&self) -> &str {
        "disabled"
    }
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("Completion provider is disabled; set [completion] provider in the config")
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client (OpenAI, Groq, LiteLLM, ...).
pub struct OpenAICompleter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAICompleter {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} environment variable not set", config.api_key_env))?;
        let base = config
            .url
            .as_deref()
            .unwrap_or(GROQ_BASE_URL)
            .trim_end_matches('/');

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: format!("{}/chat/completions", base),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompleter {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);

        let json = send_with_retry(request, 0, "chat completion").await?;
        parse_chat_response(json)
    }
}

fn parse_chat_response(json: serde_json::Value) -> Result<String> {
    let parsed: ChatResponse =
        serde_json::from_value(json).context("failed to parse chat completion response")?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| anyhow!("chat completion response has no choices"))
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: AssistantMessage,
}

/// Chat client for a local Ollama instance.
pub struct OllamaCompleter {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: Option<f32>,
}

impl OllamaCompleter {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let url = config.url.as_deref().unwrap_or(OLLAMA_BASE_URL);
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            url: url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OllamaCompleter {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });
        if let Some(t) = self.temperature {
            body["options"] = serde_json::json!({ "temperature": t });
        }
        let request = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body);

        let json = send_with_retry(request, 0, "Ollama chat")
            .await
            .with_context(|| format!("is Ollama running at {}?", self.url))?;
        let parsed: OllamaChatResponse =
            serde_json::from_value(json).context("failed to parse Ollama chat response")?;
        Ok(parsed.message.content.unwrap_or_default())
    }
}

/// Create the [`CompletionProvider`] named by the configuration.
pub fn create_completer(config: &CompletionConfig) -> Result<Arc<dyn CompletionProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledCompleter)),
        "openai" => Ok(Arc::new(OpenAICompleter::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaCompleter::new(config)?)),
        other => bail!("Unknown completion provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_is_returned_verbatim() {
        let json = serde_json::json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  The sky is blue.\n" } },
                { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(parse_chat_response(json).unwrap(), "  The sky is blue.\n");
    }

    #[test]
    fn no_choices_is_an_error() {
        let json = serde_json::json!({ "choices": [] });
        assert!(parse_chat_response(json).is_err());
    }

    #[test]
    fn request_omits_unset_options() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: None,
            max_tokens: Some(64),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 64);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn disabled_completer_errors() {
        let completer = create_completer(&CompletionConfig::default()).unwrap();
        assert!(completer.complete("prompt").await.is_err());
    }
}
