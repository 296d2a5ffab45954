//! LLM Client: the single point of entry for inference calls.
//!
//! No other module talks to the chat-completions endpoint directly; callers
//! depend on the [`CompletionProvider`] trait so tests can swap in a
//! deterministic responder.

pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 3;
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("inference credential is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Whether another attempt could plausibly succeed.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::MissingApiKey | LlmError::EmptyContent => false,
        }
    }
}

/// One structured-output request: a system prompt, a user prompt and the
/// sampling temperature. The response is always requested in JSON mode.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the raw text of the model's JSON reply.
    async fn complete_json(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI-compatible chat-completions client with bounded retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn attempt(&self, api_key: &str, body: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    /// Retries on 429, 5xx and transport failures with exponential backoff
    /// (1s, 2s). Anything else fails immediately.
    async fn complete_json(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.settings.model,
            max_tokens: MAX_TOKENS,
            temperature: request.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
        };

        let mut attempt = 0;
        loop {
            match self.attempt(api_key, &body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt + 1 < MAX_ATTEMPTS => {
                    let delay = Duration::from_millis(1000 * (1 << attempt));
                    warn!(
                        "LLM call attempt {} failed ({e}), retrying after {}ms...",
                        attempt + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> LlmSettings {
        LlmSettings {
            api_key: api_key.map(String::from),
            // Nothing listens here; any request that escapes fails fast.
            base_url: "http://127.0.0.1:9/v1/".to_string(),
            model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = LlmClient::new(settings(Some("k"))).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = LlmClient::new(settings(None)).unwrap();
        assert!(!client.has_credential());
        let request = CompletionRequest {
            system: "s",
            prompt: "p",
            temperature: 0.2,
        };
        let err = client.complete_json(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_transient_classification() {
        let rate_limited = LlmError::Api {
            status: 429,
            message: String::new(),
        };
        let unavailable = LlmError::Api {
            status: 503,
            message: String::new(),
        };
        let bad_request = LlmError::Api {
            status: 400,
            message: String::new(),
        };
        assert!(rate_limited.is_transient());
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }

    #[test]
    fn test_request_body_uses_json_mode() {
        let body = ChatRequest {
            model: "gpt-4o",
            max_tokens: MAX_TOKENS,
            temperature: 0.2,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }
}
