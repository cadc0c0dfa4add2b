//! OpenRouter provider using the Chat Completions API.
//!
//! One POST per attempt, no server-side streaming: the whole completion is
//! received before anything is shown. Pacing of the on-screen reveal happens
//! later in the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{CompletionProvider, CompletionRequest, Message, ProviderError, Role};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Sent as `HTTP-Referer` and `X-Title` so the app shows up in OpenRouter rankings.
const APP_REFERER: &str = "https://sneaker-bot.streamlit.app";
const APP_TITLE: &str = "Ultimate Sneaker Bot";

// ============================================================================
// Chat Completions API Types
// ============================================================================

#[derive(Serialize, Debug)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// The request body for `/chat/completions`
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Builds the wire message list: system prompt first, then the history as-is.
fn request_to_messages<'a>(system_prompt: &'a str, history: &'a [Message]) -> Vec<WireMessage<'a>> {
    std::iter::once(WireMessage {
        role: Role::System,
        content: system_prompt,
    })
    .chain(history.iter().map(|m| WireMessage {
        role: m.role,
        content: &m.content,
    }))
    .collect()
}

/// Extracts `choices[0].message.content` from a response body.
fn parse_completion(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Parse(format!("invalid JSON body: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("response contains no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| ProviderError::Parse("first choice has no message content".to_string()))
}

fn classify_reqwest_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_builder() {
        ProviderError::Config(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenRouter API provider using Chat Completions
pub struct OpenRouterProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider.
    ///
    /// # Arguments
    /// * `base_url` - Optional custom base URL (defaults to OpenRouter's API)
    /// * `timeout` - Upper bound for a single request, connect through body
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &request.model,
            messages: request_to_messages(&request.system_prompt, &request.messages),
            temperature: request.temperature,
            response_format: ResponseFormat { kind: "text" },
        };

        let json_body = serde_json::to_string(&body)
            .map_err(|e| ProviderError::Config(format!("Request serialization failed: {e}")))?;

        info!(
            "OpenRouter chat request: model={}, message_count={}, temperature={}",
            request.model,
            body.messages.len(),
            request.temperature
        );
        debug!("Raw OpenRouter Request: {}", json_body);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(request.credential.expose())
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .body(json_body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        debug!("OpenRouter response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenRouter API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        let text = response.text().await.map_err(classify_reqwest_error)?;
        debug!("OpenRouter response body: {} bytes", text.len());

        parse_completion(&text).inspect_err(|e| warn!("Unusable OpenRouter response: {e}"))
    }
}
