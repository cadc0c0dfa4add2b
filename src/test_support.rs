//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::config::RequestConfig;
use crate::core::session::Session;
use crate::core::state::App;
use crate::inference::{CompletionProvider, CompletionRequest, Credential, Message, ProviderError};
use crate::pipeline::RevealSink;
use crate::Model;

/// Provider that replays a fixed script of results and counts calls.
/// Runs out as a `Parse` error so over-calling shows up in assertions.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    seen: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Makes every call wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Parse("script exhausted".into())))
    }
}

/// Sink that keeps every frame and error it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<String>,
    pub errors: Vec<String>,
}

impl RevealSink for RecordingSink {
    fn show(&mut self, frame: &str) {
        self.frames.push(frame.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

pub fn test_credential() -> Credential {
    Credential::new("sk-or-v1-test-0000")
}

/// Session with a credential and default settings.
pub fn test_session() -> Session {
    let mut config = RequestConfig::default();
    config.set_credential(test_credential());
    Session::new(config)
}

/// Minimal request as the builder would produce for a first question.
pub fn test_request() -> CompletionRequest {
    CompletionRequest {
        model: Model::default().id().to_string(),
        system_prompt: "You are a professional sneaker release analyst.".to_string(),
        messages: vec![Message::assistant("hi"), Message::user("any drops?")],
        temperature: 0.7,
        credential: test_credential(),
    }
}

/// App over a credentialed session, topic filter off.
pub fn test_app() -> App {
    App::new(test_session(), false)
}
