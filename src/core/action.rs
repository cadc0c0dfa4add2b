//! # Actions
//!
//! Everything that can happen in the bot becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The background turn shows another word? That's `Action::RevealFrame(frame)`.
//!
//! `update()` applies an action to the state and returns an [`Effect`] for
//! the adapter to carry out. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info};

use crate::core::state::App;
use crate::inference::Credential;
use crate::pipeline::{PreparedTurn, TurnReply, TurnStart, begin_turn};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit(String),
    SetCredential(Credential),
    /// Temperature change in tenths.
    AdjustTemperature(i8),
    AdjustRetries(i8),
    ResetChat,
    RevealFrame(String),
    ShowError(String),
    TurnFinished(TurnReply),
    Quit,
}

/// Side effect requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Run the prepared turn in the background.
    Dispatch(PreparedTurn),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if app.is_loading {
                debug!("Submit ignored: turn in flight");
                return Effect::None;
            }
            app.error = None;
            let today = chrono::Local::now().date_naive();
            match begin_turn(&mut app.session, &text, app.topic_filter, today) {
                TurnStart::Abandoned(e) => {
                    app.error = Some(e.user_message());
                    app.status_message = String::from("API key required (Ctrl+K)");
                    Effect::None
                }
                TurnStart::Refused => {
                    app.status_message = String::from("Off-topic prompt refused");
                    Effect::None
                }
                TurnStart::Dispatch(turn) => {
                    app.is_loading = true;
                    app.reveal = Some(String::new());
                    app.status_message = String::from("🔍 Checking the latest sneaker news...");
                    Effect::Dispatch(turn)
                }
            }
        }
        Action::SetCredential(credential) => {
            app.status_message = if credential.is_missing() {
                String::from("API key cleared")
            } else {
                format!("API key set ({})", credential.masked())
            };
            app.session.config.set_credential(credential);
            Effect::None
        }
        Action::AdjustTemperature(steps) => {
            app.session.config.adjust_temperature(steps);
            app.status_message =
                format!("Temperature: {:.1}", app.session.config.temperature());
            Effect::None
        }
        Action::AdjustRetries(delta) => {
            app.session.config.adjust_max_retries(delta);
            app.status_message = format!("Max retries: {}", app.session.config.max_retries());
            Effect::None
        }
        Action::ResetChat => {
            if app.is_loading {
                debug!("Reset ignored: turn in flight");
                return Effect::None;
            }
            app.session.reset();
            app.error = None;
            app.reveal = None;
            app.status_message = String::from("Chat cleared");
            Effect::None
        }
        Action::RevealFrame(frame) => {
            if app.is_loading {
                app.reveal = Some(frame);
            }
            Effect::None
        }
        Action::ShowError(message) => {
            app.error = Some(message);
            Effect::None
        }
        Action::TurnFinished(reply) => {
            info!(
                "Turn finished after {} attempt(s), failed={}",
                reply.attempts,
                reply.error.is_some()
            );
            app.session.record_reply(&reply.content);
            app.is_loading = false;
            app.reveal = None;
            app.status_message = match &reply.error {
                Some(e) => format!("Failed: {e}"),
                None => format!("Reply received ({} attempt(s))", reply.attempts),
            };
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}
