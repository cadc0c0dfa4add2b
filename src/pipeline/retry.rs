//! # Retry Controller
//!
//! Sends one request up to `max_attempts` times. Only an unusable response
//! body is worth another try; transport problems end the turn at once.
//!
//! ```text
//! attempt ──► Success(text) ─────────────────────────► done
//!    │
//!    ├──► Recoverable ──► attempts left? ──yes──► sleep(backoff) ──► attempt
//!    │                          └──no──► done (MalformedResponse)
//!    └──► Fatal ─────────────────────────────────────► done
//! ```

use std::time::Duration;

use log::{debug, error, info, warn};

use super::TurnError;
use crate::core::config::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_TIMEOUT_SECS};
use crate::inference::{CompletionProvider, CompletionRequest, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    pub max_attempts: u8,
    /// Fixed pause before each retry.
    pub backoff: Duration,
    /// Upper bound for one attempt, enforced on top of the client timeout.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            attempt_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// What one attempt means for the turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success(String),
    Recoverable(TurnError),
    Fatal(TurnError),
}

impl AttemptOutcome {
    pub fn classify(result: Result<String, ProviderError>) -> Self {
        match result {
            Ok(text) => AttemptOutcome::Success(text),
            Err(ProviderError::Parse(msg)) => {
                AttemptOutcome::Recoverable(TurnError::MalformedResponse(msg))
            }
            Err(e @ (ProviderError::Network(_) | ProviderError::Timeout | ProviderError::Api { .. })) => {
                AttemptOutcome::Fatal(TurnError::TransportFailure(e.to_string()))
            }
            Err(ProviderError::Config(msg)) => {
                AttemptOutcome::Fatal(TurnError::UnclassifiedFailure(msg))
            }
        }
    }
}

/// Result of the whole retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryReport {
    /// Raw completion text, or the error that ended the loop.
    pub result: Result<String, TurnError>,
    /// Attempts actually made. Always `1..=max_attempts`.
    pub attempts: u8,
}

async fn attempt(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    timeout: Duration,
) -> AttemptOutcome {
    match tokio::time::timeout(timeout, provider.complete(request)).await {
        Ok(result) => AttemptOutcome::classify(result),
        Err(_) => {
            warn!("Attempt exceeded {:?}", timeout);
            AttemptOutcome::Fatal(TurnError::TransportFailure(
                ProviderError::Timeout.to_string(),
            ))
        }
    }
}

/// Runs the retry loop for one turn. The request is resent unchanged.
pub async fn send_with_retry(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    policy: &RetryPolicy,
) -> RetryReport {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts: u8 = 0;

    loop {
        attempts += 1;
        debug!(
            "Sending to {} (attempt {}/{})",
            provider.name(),
            attempts,
            max_attempts
        );

        match attempt(provider, request, policy.attempt_timeout).await {
            AttemptOutcome::Success(text) => {
                info!("Completion received after {} attempt(s)", attempts);
                return RetryReport {
                    result: Ok(text),
                    attempts,
                };
            }
            AttemptOutcome::Recoverable(e) => {
                error!("Unusable response on attempt {}: {}", attempts, e);
                if attempts >= max_attempts {
                    warn!("Giving up after {} attempts", attempts);
                    return RetryReport {
                        result: Err(e),
                        attempts,
                    };
                }
                tokio::time::sleep(policy.backoff).await;
            }
            AttemptOutcome::Fatal(e) => {
                error!("Attempt {} failed, not retrying: {}", attempts, e);
                return RetryReport {
                    result: Err(e),
                    attempts,
                };
            }
        }
    }
}
