use std::fmt;

use async_trait::async_trait;

use super::types::{Credential, Message};

/// Errors a provider can report for a single completion attempt.
/// The retry controller decides what each variant means for the turn.
#[derive(Debug)]
pub enum ProviderError {
    /// Request could not be constructed (bad base URL, invalid header value).
    Config(String),
    /// Transport-level failure (DNS, connection refused, reset, body read).
    Network(String),
    /// The request did not finish within the attempt timeout.
    Timeout,
    /// API answered with a non-2xx status.
    Api { status: u16, message: String },
    /// Body arrived but the completion text could not be located in it.
    Parse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Timeout => write!(f, "request timed out"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill one completion.
///
/// Owned so the same payload can be resent unchanged on every retry and moved
/// into a background task.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    /// Conversation history, oldest first, ending with the new user turn.
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub credential: Credential,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Performs one completion call and returns the raw completion text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}
