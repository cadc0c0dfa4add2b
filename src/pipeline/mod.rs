//! # Response Pipeline
//!
//! Everything between "user pressed Enter" and "reply is in the transcript".
//!
//! ```text
//! prompt ──► begin_turn ──► Request Builder ──► Retry Controller ──► Formatter ──► reveal
//!               │                                     │                               │
//!               └─ no key: abandoned                  └─ failure: placeholder          ▼
//!                                                                              record_reply
//! ```
//!
//! A turn runs to completion before the next prompt is accepted. Every
//! completed turn adds exactly two messages to the conversation; an
//! abandoned turn adds none.
//!
//! ## Modules
//!
//! - [`request`]: builds the owned request payload
//! - [`retry`]: bounded retries and error classification
//! - [`format`]: cleans and decorates the completion text
//! - [`reveal`]: word-by-word display and the [`RevealSink`] trait

pub mod format;
pub mod request;
pub mod retry;
pub mod reveal;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{info, warn};

use crate::core::config::{DEFAULT_REVEAL_DELAY_MS, ResolvedConfig};
use crate::core::session::Session;
use crate::core::topic::is_on_topic;
use crate::inference::{CompletionProvider, CompletionRequest};

pub use format::format_completion;
pub use retry::{AttemptOutcome, RetryPolicy, RetryReport, send_with_retry};
pub use reveal::{CURSOR_GLYPH, RevealSink, reveal};

// ============================================================================
// Canned texts
// ============================================================================

pub const API_KEY_REQUIRED: &str =
    "🔐 API key required! Please enter your OpenRouter key in the sidebar.";
pub const OFF_TOPIC_REFUSAL: &str =
    "🚫 I only talk sneakers! Ask me about releases, raffles, restocks or resell prices. 👟";
pub const TRANSPORT_PLACEHOLDER: &str = "⚠️ Connection issue - try again later";
pub const MALFORMED_PLACEHOLDER: &str = "🔄 Error: Please try asking differently";
pub const MALFORMED_NOTICE: &str = "⚠️ Failed to process response. Try rephrasing";
pub const UNCLASSIFIED_PLACEHOLDER: &str = "😢 Oops! Something went wrong.";

// ============================================================================
// Error taxonomy
// ============================================================================

/// Ways a turn can end without a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnError {
    /// No credential configured. Checked before anything is appended.
    MissingCredential,
    /// Topic filter is on and the prompt isn't about sneakers.
    OffTopicInput,
    /// Connection, timeout, or non-2xx status. Never retried.
    TransportFailure(String),
    /// Response body unusable. Retried until attempts run out.
    MalformedResponse(String),
    /// Anything else, e.g. a request that could not be built.
    UnclassifiedFailure(String),
}

impl TurnError {
    /// Text shown in place of the reply.
    pub fn user_message(&self) -> String {
        match self {
            TurnError::MissingCredential => API_KEY_REQUIRED.to_string(),
            TurnError::OffTopicInput => OFF_TOPIC_REFUSAL.to_string(),
            TurnError::TransportFailure(e) => format!("🌐 Network Error: {e}"),
            TurnError::MalformedResponse(_) => MALFORMED_NOTICE.to_string(),
            TurnError::UnclassifiedFailure(e) => format!("❌ Error: {e}"),
        }
    }

    /// Assistant text recorded in history, if the turn records one.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            TurnError::MissingCredential => None,
            TurnError::OffTopicInput => Some(OFF_TOPIC_REFUSAL),
            TurnError::TransportFailure(_) => Some(TRANSPORT_PLACEHOLDER),
            TurnError::MalformedResponse(_) => Some(MALFORMED_PLACEHOLDER),
            TurnError::UnclassifiedFailure(_) => Some(UNCLASSIFIED_PLACEHOLDER),
        }
    }
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::MissingCredential => write!(f, "missing API credential"),
            TurnError::OffTopicInput => write!(f, "prompt is off topic"),
            TurnError::TransportFailure(e) => write!(f, "transport failure: {e}"),
            TurnError::MalformedResponse(e) => write!(f, "malformed response: {e}"),
            TurnError::UnclassifiedFailure(e) => write!(f, "unexpected failure: {e}"),
        }
    }
}

impl std::error::Error for TurnError {}

// ============================================================================
// Turn types
// ============================================================================

/// A request ready to send, with the retry limit in force when it was built.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTurn {
    pub request: CompletionRequest,
    pub max_attempts: u8,
}

/// How a turn starts.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStart {
    /// Nothing was appended; the turn ends here.
    Abandoned(TurnError),
    /// User message and refusal were both appended.
    Refused,
    /// User message appended; the request still has to be sent.
    Dispatch(PreparedTurn),
}

/// The assistant side of a dispatched turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// Formatted reply, or the placeholder on failure.
    pub content: String,
    pub attempts: u8,
    pub error: Option<TurnError>,
}

/// How a full turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Abandoned(TurnError),
    Refused,
    Completed(TurnReply),
}

/// Validates the prompt against the session and appends the user message.
///
/// Credential is checked first, so a turn without one leaves history alone.
pub fn begin_turn(
    session: &mut Session,
    prompt: &str,
    topic_filter: bool,
    today: NaiveDate,
) -> TurnStart {
    if session.config.credential().is_missing() {
        warn!("Turn abandoned: {}", TurnError::MissingCredential);
        return TurnStart::Abandoned(TurnError::MissingCredential);
    }

    session.append_user(prompt);

    if topic_filter && !is_on_topic(prompt) {
        info!("Prompt refused by topic filter");
        session.record_reply(OFF_TOPIC_REFUSAL);
        return TurnStart::Refused;
    }

    let request = request::build_request(session.conversation(), &session.config, today);
    TurnStart::Dispatch(PreparedTurn {
        request,
        max_attempts: session.config.max_retries(),
    })
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Backoff and timeout. `max_attempts` is taken from each turn instead.
    pub retry: RetryPolicy,
    pub reveal_pace: Duration,
    pub topic_filter: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            reveal_pace: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
            topic_filter: false,
        }
    }
}

impl From<&ResolvedConfig> for PipelineSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: config.max_retries,
                backoff: config.retry_backoff,
                attempt_timeout: config.request_timeout,
            },
            reveal_pace: config.reveal_delay,
            topic_filter: config.topic_filter,
        }
    }
}

#[derive(Clone)]
pub struct ResponsePipeline {
    provider: Arc<dyn CompletionProvider>,
    settings: PipelineSettings,
}

impl ResponsePipeline {
    pub fn new(provider: Arc<dyn CompletionProvider>, settings: PipelineSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Sends a prepared turn, formats the reply, and reveals it through `sink`.
    ///
    /// On failure the sink gets the error text and the reply carries the
    /// placeholder that belongs in history.
    pub async fn complete_turn(&self, turn: &PreparedTurn, sink: &mut dyn RevealSink) -> TurnReply {
        let policy = RetryPolicy {
            max_attempts: turn.max_attempts,
            ..self.settings.retry
        };
        let report = send_with_retry(self.provider.as_ref(), &turn.request, &policy).await;

        match report.result {
            Ok(raw) => {
                let content = format_completion(&raw);
                reveal(&content, self.settings.reveal_pace, sink).await;
                TurnReply {
                    content,
                    attempts: report.attempts,
                    error: None,
                }
            }
            Err(e) => {
                sink.error(&e.user_message());
                TurnReply {
                    content: e.placeholder().unwrap_or(UNCLASSIFIED_PLACEHOLDER).to_string(),
                    attempts: report.attempts,
                    error: Some(e),
                }
            }
        }
    }

    /// Runs one full turn against `session`, dated today.
    pub async fn run_turn(
        &self,
        session: &mut Session,
        prompt: &str,
        sink: &mut dyn RevealSink,
    ) -> TurnOutcome {
        let today = chrono::Local::now().date_naive();
        self.run_turn_on(session, prompt, today, sink).await
    }

    pub async fn run_turn_on(
        &self,
        session: &mut Session,
        prompt: &str,
        today: NaiveDate,
        sink: &mut dyn RevealSink,
    ) -> TurnOutcome {
        match begin_turn(session, prompt, self.settings.topic_filter, today) {
            TurnStart::Abandoned(e) => {
                sink.error(&e.user_message());
                TurnOutcome::Abandoned(e)
            }
            TurnStart::Refused => {
                sink.show(OFF_TOPIC_REFUSAL);
                TurnOutcome::Refused
            }
            TurnStart::Dispatch(turn) => {
                let reply = self.complete_turn(&turn, sink).await;
                session.record_reply(&reply.content);
                TurnOutcome::Completed(reply)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ProviderError, Role};
    use crate::test_support::{RecordingSink, ScriptedProvider, test_session};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn pipeline(provider: Arc<ScriptedProvider>, topic_filter: bool) -> ResponsePipeline {
        ResponsePipeline::new(
            provider,
            PipelineSettings {
                retry: RetryPolicy {
                    max_attempts: 2,
                    backoff: Duration::from_millis(1),
                    attempt_timeout: Duration::from_secs(5),
                },
                reveal_pace: Duration::ZERO,
                topic_filter,
            },
        )
    }

    #[test]
    fn test_missing_credential_leaves_history_untouched() {
        let mut session = Session::default();
        let start = begin_turn(&mut session, "any drops?", false, today());

        assert_eq!(start, TurnStart::Abandoned(TurnError::MissingCredential));
        assert_eq!(session.conversation().len(), 1);
    }

    #[test]
    fn test_missing_credential_wins_over_topic_filter() {
        let mut session = Session::default();
        let start = begin_turn(&mut session, "weather?", true, today());
        assert_eq!(start, TurnStart::Abandoned(TurnError::MissingCredential));
    }

    #[test]
    fn test_off_topic_prompt_is_refused_with_two_messages() {
        let mut session = test_session();
        let start = begin_turn(&mut session, "what's the weather", true, today());

        assert_eq!(start, TurnStart::Refused);
        assert_eq!(session.conversation().len(), 3);
        assert_eq!(session.conversation().last().unwrap().content, OFF_TOPIC_REFUSAL);
    }

    #[test]
    fn test_dispatch_includes_new_user_message() {
        let mut session = test_session();
        session.config.set_max_retries(4);
        let TurnStart::Dispatch(turn) = begin_turn(&mut session, "Dunk restock?", true, today())
        else {
            panic!("expected dispatch");
        };

        assert_eq!(turn.max_attempts, 4);
        let last = turn.request.messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "Dunk restock?");
        assert!(turn.request.system_prompt.ends_with("June 01, 2024"));
    }

    #[test]
    fn test_placeholders_and_messages() {
        assert_eq!(TurnError::MissingCredential.placeholder(), None);
        assert_eq!(
            TurnError::TransportFailure("x".into()).placeholder(),
            Some(TRANSPORT_PLACEHOLDER)
        );
        assert_eq!(
            TurnError::TransportFailure("refused".into()).user_message(),
            "🌐 Network Error: refused"
        );
        assert_eq!(
            TurnError::MalformedResponse("x".into()).user_message(),
            MALFORMED_NOTICE
        );
        assert_eq!(
            TurnError::UnclassifiedFailure("boom".into()).user_message(),
            "❌ Error: boom"
        );
    }

    #[tokio::test]
    async fn test_run_turn_records_formatted_reply() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(
            "- Release Name: Air Max\n- Date: June 1, 2024".into(),
        )]));
        let pipeline = pipeline(provider.clone(), false);
        let mut session = test_session();
        let mut sink = RecordingSink::default();

        let outcome = pipeline
            .run_turn_on(&mut session, "Air Max drops?", today(), &mut sink)
            .await;

        let expected = "🔥 Release Name: Air Max\n📅 Date: June 1, 2024";
        assert!(matches!(&outcome, TurnOutcome::Completed(r) if r.content == expected));
        assert_eq!(session.conversation().len(), 3);
        assert_eq!(session.conversation().last().unwrap().content, expected);
        assert_eq!(sink.frames.last().unwrap(), "🔥 Release Name: Air Max 📅 Date: June 1, 2024 ");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_turn_without_credential_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("unused".into())]));
        let pipeline = pipeline(provider.clone(), false);
        let mut session = Session::default();
        let mut sink = RecordingSink::default();

        let outcome = pipeline
            .run_turn_on(&mut session, "hi", today(), &mut sink)
            .await;

        assert_eq!(outcome, TurnOutcome::Abandoned(TurnError::MissingCredential));
        assert_eq!(provider.calls(), 0);
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(sink.errors, vec![API_KEY_REQUIRED.to_string()]);
    }

    #[tokio::test]
    async fn test_run_turn_refusal_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let pipeline = pipeline(provider.clone(), true);
        let mut session = test_session();
        let mut sink = RecordingSink::default();

        let outcome = pipeline
            .run_turn_on(&mut session, "tell me a joke", today(), &mut sink)
            .await;

        assert_eq!(outcome, TurnOutcome::Refused);
        assert_eq!(provider.calls(), 0);
        assert_eq!(session.conversation().len(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_record_placeholder() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ProviderError::Parse("bad".into())),
            Err(ProviderError::Parse("bad".into())),
        ]));
        let pipeline = pipeline(provider.clone(), false);
        let mut session = test_session();
        let mut sink = RecordingSink::default();

        let outcome = pipeline
            .run_turn_on(&mut session, "Jordan 1 dates", today(), &mut sink)
            .await;

        let TurnOutcome::Completed(reply) = outcome else {
            panic!("expected completed turn");
        };
        assert_eq!(reply.attempts, 2);
        assert_eq!(reply.content, MALFORMED_PLACEHOLDER);
        assert_eq!(session.conversation().last().unwrap().content, MALFORMED_PLACEHOLDER);
        assert_eq!(sink.errors, vec![MALFORMED_NOTICE.to_string()]);
        assert!(sink.frames.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_records_placeholder_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Api {
            status: 503,
            message: "overloaded".into(),
        })]));
        let pipeline = pipeline(provider.clone(), false);
        let mut session = test_session();
        let mut sink = RecordingSink::default();

        pipeline
            .run_turn_on(&mut session, "Yeezy restock", today(), &mut sink)
            .await;

        assert_eq!(provider.calls(), 1);
        assert_eq!(session.conversation().len(), 3);
        assert_eq!(
            session.conversation().last().unwrap().content,
            TRANSPORT_PLACEHOLDER
        );
        assert!(sink.errors[0].starts_with("🌐 Network Error:"));
    }

    #[tokio::test]
    async fn test_every_completed_turn_adds_two_messages() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("one".into()),
            Err(ProviderError::Network("reset".into())),
            Err(ProviderError::Config("bad header".into())),
            Ok("four".into()),
        ]));
        let pipeline = pipeline(provider, false);
        let mut session = test_session();
        let mut sink = RecordingSink::default();

        for (i, prompt) in ["a", "b", "c", "d"].iter().enumerate() {
            let before = session.conversation().len();
            pipeline.run_turn_on(&mut session, prompt, today(), &mut sink).await;
            assert_eq!(session.conversation().len(), before + 2, "turn {i}");
        }
    }

    #[test]
    fn test_settings_from_resolved_config() {
        let resolved = crate::core::config::resolve(
            &crate::core::config::BotConfig::default(),
            &crate::core::config::CliOverrides {
                topic_filter: true,
                ..Default::default()
            },
        );
        let settings = PipelineSettings::from(&resolved);
        assert_eq!(settings.retry.max_attempts, 2);
        assert_eq!(settings.retry.backoff, Duration::from_millis(500));
        assert_eq!(settings.reveal_pace, Duration::from_millis(30));
        assert!(settings.topic_filter);
    }
}
