//! Text-generation provider
//!
//! One system/user message pair in, free text out. No retries: a failed call
//! is reported once and the caller decides what to show instead.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// No API key available; shown to the user as "not configured"
    #[error("API key not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Anything that can turn a prompt pair into text
pub trait TextGenerator {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// Provider settings, normally read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Whole-request limit, so a silent provider surfaces as a failure
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    /// `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`, `OPENAI_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: non_empty("OPENAI_API_KEY"),
            model: non_empty("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            timeout: non_empty("OPENAI_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.ok_or(LlmError::NotConfigured)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model: config.model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(LlmConfig::from_env())
    }
}

impl TextGenerator for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature: TEMPERATURE,
        };

        debug!("Requesting completion from {} ({})", self.base_url, self.model);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !status.is_success() {
            warn!("Completion request failed with HTTP {}", status);
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(LlmError::Api(error_resp.error.message));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;

    fn config(base_url: String) -> LlmConfig {
        LlmConfig {
            api_key: Some("test-key".to_string()),
            model: "gpt-4o-mini".to_string(),
            base_url,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let result = OpenAiClient::new(LlmConfig::default());
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJsonString(
                r#"{"model":"gpt-4o-mini","messages":[{"role":"system","content":"be brief"},{"role":"user","content":"what now?"}]}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" Squat 102.5kg today. "}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(config(server.url())).unwrap();
        let text = client.complete("be brief", "what now?").await.unwrap();

        assert_eq!(text, "Squat 102.5kg today.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(config(server.url())).unwrap();
        let err = client.complete("s", "u").await.unwrap_err();

        assert_eq!(err, LlmError::Api("Incorrect API key provided".to_string()));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let client = OpenAiClient::new(config(server.url())).unwrap();
        match client.complete("s", "u").await {
            Err(LlmError::Api(message)) => assert!(message.contains("bad gateway"), "{}", message),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_silent_provider_times_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(2));
                w.write_all(br#"{"choices":[]}"#)
            })
            .create_async()
            .await;

        let client = OpenAiClient::new(LlmConfig {
            timeout: Duration::from_millis(200),
            ..config(server.url())
        })
        .unwrap();
        assert!(matches!(client.complete("s", "u").await, Err(LlmError::Request(_))));
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(config(server.url())).unwrap();
        assert!(matches!(client.complete("s", "u").await, Err(LlmError::Parse(_))));
    }
}
