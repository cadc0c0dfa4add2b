//! # TitleBar Component
//!
//! Top status bar: app name, model, and the latest status message, plus a
//! "↓ New" marker when there is transcript content below the scroll position.
//!
//! Stateless. All fields are props supplied by the parent each frame.
//!
//! The title text changes based on state:
//!
//! 1. **Unseen content**: `"👟 Sneaker Bot (model: …) | Loading... | ↓ New"`
//! 2. **Status message**: `"👟 Sneaker Bot (model: …) | Loading..."`
//! 3. **Default**: `"👟 Sneaker Bot (model: …)"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
    /// A turn is in flight; the status is drawn bold.
    pub is_loading: bool,
}

impl TitleBar {
    pub fn new(
        model_name: String,
        status_message: String,
        has_unseen_content: bool,
        is_loading: bool,
    ) -> Self {
        Self {
            model_name,
            status_message,
            has_unseen_content,
            is_loading,
        }
    }

    fn title_text(&self) -> String {
        let base = format!("👟 Sneaker Bot (model: {})", self.model_name);
        match (self.status_message.is_empty(), self.has_unseen_content) {
            (_, true) => format!("{base} | {} | ↓ New", self.status_message),
            (true, false) => base,
            (false, false) => format!("{base} | {}", self.status_message),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.is_loading {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        frame.render_widget(Span::styled(self.title_text(), style), area);
    }
}
