//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Turns
//!
//! Enter runs `update(Action::Submit)`. If the reducer asks for a dispatch,
//! the prepared turn runs on a tokio task; reveal frames, errors and the
//! final reply come back as `Action`s over an mpsc channel.
//!
//! ## Redraw Strategy
//!
//! - **Loading**: draws every ~80ms so the pending reply pulses.
//! - **Idle**: sleeps up to 500ms, only redraws on events.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::state::App;
use crate::inference::Credential;
use crate::pipeline::{PreparedTurn, ResponsePipeline, RevealSink};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// What the input box is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Prompts for the bot.
    Chat,
    /// The API key, drawn masked. Esc returns to Chat.
    Credential,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub input_mode: InputMode,
    pub pulse_value: f32,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            input_mode: InputMode::Chat,
            pulse_value: 0.0,
        }
    }
}

/// Forwards reveal output to the event loop.
struct ChannelSink {
    tx: mpsc::Sender<Action>,
}

impl RevealSink for ChannelSink {
    fn show(&mut self, frame: &str) {
        if self.tx.send(Action::RevealFrame(frame.to_string())).is_err() {
            warn!("Failed to forward reveal frame: receiver dropped");
        }
    }

    fn error(&mut self, message: &str) {
        if self.tx.send(Action::ShowError(message.to_string())).is_err() {
            warn!("Failed to forward error: receiver dropped");
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

fn spawn_turn(pipeline: ResponsePipeline, turn: PreparedTurn, tx: mpsc::Sender<Action>) {
    info!(
        "Spawning turn: model={}, messages={}, max_attempts={}",
        turn.request.model,
        turn.request.messages.len(),
        turn.max_attempts
    );
    tokio::spawn(async move {
        let mut sink = ChannelSink { tx: tx.clone() };
        let reply = pipeline.complete_turn(&turn, &mut sink).await;
        if tx.send(Action::TurnFinished(reply)).is_err() {
            warn!("Failed to send TurnFinished: receiver dropped");
        }
    });
}

/// One-line log form of an action. Reveal frames grow with the reply, so only
/// their size is logged.
fn log_summary(action: &Action) -> String {
    match action {
        Action::RevealFrame(frame) => format!("RevealFrame({} bytes)", frame.len()),
        other => format!("{other:?}"),
    }
}

/// Maps a terminal event to a core action, if it is one.
fn core_action(event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => Some(Action::Quit),
        TuiEvent::ResetChat => Some(Action::ResetChat),
        TuiEvent::TemperatureDown => Some(Action::AdjustTemperature(-1)),
        TuiEvent::TemperatureUp => Some(Action::AdjustTemperature(1)),
        TuiEvent::RetriesDown => Some(Action::AdjustRetries(-1)),
        TuiEvent::RetriesUp => Some(Action::AdjustRetries(1)),
        _ => None,
    }
}

/// Routes one terminal event. Returns the action to apply, if any.
fn handle_event(app: &App, tui: &mut TuiState, event: TuiEvent) -> Option<Action> {
    if let Some(action) = core_action(&event) {
        return Some(action);
    }

    match (&event, tui.input_mode) {
        (TuiEvent::EnterCredential, _) => {
            tui.input_mode = InputMode::Credential;
            tui.input_box.clear();
            None
        }
        (TuiEvent::Escape, InputMode::Credential) => {
            tui.input_mode = InputMode::Chat;
            tui.input_box.clear();
            None
        }
        (TuiEvent::Escape, InputMode::Chat) => Some(Action::Quit),
        (
            TuiEvent::ScrollUp
            | TuiEvent::ScrollDown
            | TuiEvent::ScrollPageUp
            | TuiEvent::ScrollPageDown,
            _,
        ) => {
            tui.message_list.handle_event(&event);
            None
        }
        // Keep the draft while a turn is in flight
        (TuiEvent::Submit, InputMode::Chat) if app.is_loading => None,
        _ => match tui.input_box.handle_event(&event)? {
            InputEvent::Submit(text) => match tui.input_mode {
                InputMode::Credential => {
                    tui.input_mode = InputMode::Chat;
                    Some(Action::SetCredential(Credential::new(text)))
                }
                InputMode::Chat => {
                    tui.message_list.stick_to_bottom = true;
                    Some(Action::Submit(text))
                }
            },
            InputEvent::ContentChanged => None,
        },
    }
}

pub fn run(mut app: App, pipeline: ResponsePipeline) -> std::io::Result<()> {
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background turns
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'event_loop: loop {
        if app.is_loading {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 5.0).sin() * 0.5 + 0.5;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if app.is_loading {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let TuiEvent::MouseMove(_col, row) = event {
                let frame_area = terminal.get_frame().area();
                tui.message_list.hovered_index = ui::hit_test_message(
                    row,
                    frame_area,
                    app.error.is_some(),
                    tui.message_list.scroll_state.offset().y,
                    &tui.message_list.layout.prefix_heights,
                );
                continue;
            }

            let Some(action) = handle_event(&app, &mut tui, event) else {
                continue;
            };
            match update(&mut app, action) {
                Effect::Quit => break 'event_loop,
                Effect::Dispatch(turn) => spawn_turn(pipeline.clone(), turn, tx.clone()),
                Effect::None => {}
            }
        }

        // Handle background turn actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {}", log_summary(&action));
            if update(&mut app, action) == Effect::Quit {
                break 'event_loop;
            }
        }
    }

    ratatui::restore();
    info!(
        "Exiting with {} messages in conversation",
        app.session.conversation().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;

    fn type_text(app: &App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_event(app, tui, TuiEvent::InputChar(c)), None);
        }
    }

    #[test]
    fn test_enter_submits_prompt() {
        let app = test_app();
        let mut tui = TuiState::new();
        type_text(&app, &mut tui, "dunk");

        let action = handle_event(&app, &mut tui, TuiEvent::Submit);
        assert_eq!(action, Some(Action::Submit("dunk".into())));
    }

    #[test]
    fn test_credential_entry_round_trip() {
        let app = test_app();
        let mut tui = TuiState::new();

        handle_event(&app, &mut tui, TuiEvent::EnterCredential);
        assert_eq!(tui.input_mode, InputMode::Credential);
        type_text(&app, &mut tui, "sk-or-1");

        let action = handle_event(&app, &mut tui, TuiEvent::Submit);
        assert_eq!(action, Some(Action::SetCredential(Credential::new("sk-or-1"))));
        assert_eq!(tui.input_mode, InputMode::Chat);
    }

    #[test]
    fn test_escape_cancels_credential_entry() {
        let app = test_app();
        let mut tui = TuiState::new();

        handle_event(&app, &mut tui, TuiEvent::EnterCredential);
        type_text(&app, &mut tui, "sk-");
        assert_eq!(handle_event(&app, &mut tui, TuiEvent::Escape), None);

        assert_eq!(tui.input_mode, InputMode::Chat);
        assert!(tui.input_box.text().is_empty());
    }

    #[test]
    fn test_escape_in_chat_quits() {
        let app = test_app();
        let mut tui = TuiState::new();
        assert_eq!(
            handle_event(&app, &mut tui, TuiEvent::Escape),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_submit_while_loading_keeps_draft() {
        let mut app = test_app();
        app.is_loading = true;
        let mut tui = TuiState::new();
        type_text(&app, &mut tui, "next");

        assert_eq!(handle_event(&app, &mut tui, TuiEvent::Submit), None);
        assert_eq!(tui.input_box.text(), "next");
    }

    #[test]
    fn test_function_keys_map_to_actions() {
        let app = test_app();
        let mut tui = TuiState::new();
        assert_eq!(
            handle_event(&app, &mut tui, TuiEvent::TemperatureUp),
            Some(Action::AdjustTemperature(1))
        );
        assert_eq!(
            handle_event(&app, &mut tui, TuiEvent::RetriesDown),
            Some(Action::AdjustRetries(-1))
        );
        assert_eq!(
            handle_event(&app, &mut tui, TuiEvent::ResetChat),
            Some(Action::ResetChat)
        );
    }

    #[test]
    fn test_log_summary_omits_reveal_text() {
        let frame = "🔥 Release Name: Air Jordan 1 ▌".to_string();
        let summary = log_summary(&Action::RevealFrame(frame.clone()));

        assert_eq!(summary, format!("RevealFrame({} bytes)", frame.len()));
        assert!(!summary.contains("Air Jordan"));
        assert_eq!(log_summary(&Action::ResetChat), "ResetChat");
    }

    #[test]
    fn test_channel_sink_forwards_actions() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink { tx };
        sink.show("Fresh ▌");
        sink.error("boom");

        assert_eq!(rx.try_recv().unwrap(), Action::RevealFrame("Fresh ▌".into()));
        assert_eq!(rx.try_recv().unwrap(), Action::ShowError("boom".into()));
    }
}
