//! # InputBox Component
//!
//! One-line prompt field. Doubles as the credential entry field, in which
//! case every character is drawn as a bullet.
//!
//! ## State Management
//!
//! The buffer is internal state (`LineEditor`). `masked` and `disabled` are
//! props set by the parent each frame.

mod editor;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use editor::{LineEditor, visible_tail};

/// Border (2) + padding (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Offset from area edge to content (border + padding)
const CONTENT_OFFSET: u16 = 2;
/// Borders plus one line of text
pub const INPUT_HEIGHT: u16 = 3;

const MASK_CHAR: char = '•';

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with non-blank text (or any text when masked)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    editor: LineEditor,
    /// Draw characters as bullets (Prop)
    pub masked: bool,
    /// Grey out while a turn is in flight (Prop)
    pub disabled: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            editor: LineEditor::default(),
            masked: false,
            disabled: false,
        }
    }

    pub fn text(&self) -> &str {
        self.editor.text()
    }

    /// Drops whatever was typed.
    pub fn clear(&mut self) {
        self.editor.take();
    }

    fn display_text(&self) -> String {
        if self.masked {
            MASK_CHAR.to_string().repeat(self.editor.char_count())
        } else {
            self.editor.text().to_string()
        }
    }

    fn title(&self) -> &'static str {
        match (self.masked, self.disabled) {
            (true, _) => "🔑 OpenRouter API Key (Enter: save, Esc: cancel)",
            (false, true) => "🔍 Checking the latest sneaker news...",
            (false, false) => "Ask about sneakers...",
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let cursor_column = self.editor.cursor_column(self.masked);
        let (visible, dropped) = visible_tail(&self.display_text(), inner_width, cursor_column);

        let (style, border_style) = match (self.masked, self.disabled) {
            (true, _) => (
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Yellow),
            ),
            (false, true) => (
                Style::default().fg(Color::DarkGray),
                Style::default().add_modifier(Modifier::DIM),
            ),
            (false, false) => (Style::default().fg(Color::Green), Style::default()),
        };

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title(self.title())
            .padding(ratatui::widgets::Padding::horizontal(1));

        frame.render_widget(Paragraph::new(visible).block(block).style(style), area);

        if !self.disabled {
            let column = cursor_column.saturating_sub(dropped);
            frame.set_cursor_position((area.x + CONTENT_OFFSET + column, area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let changed = match event {
            TuiEvent::InputChar(c) => {
                self.editor.insert_char(*c);
                true
            }
            TuiEvent::Paste(text) => {
                self.editor.insert_str(text);
                true
            }
            TuiEvent::Backspace => self.editor.backspace(),
            TuiEvent::Delete => self.editor.delete(),
            TuiEvent::CursorLeft => self.editor.move_left(),
            TuiEvent::CursorRight => self.editor.move_right(),
            TuiEvent::CursorHome => self.editor.move_home(),
            TuiEvent::CursorEnd => self.editor.move_end(),
            TuiEvent::Submit => {
                // An empty key submission clears the credential
                if self.masked || !self.editor.is_blank() {
                    return Some(InputEvent::Submit(self.editor.take()));
                }
                false
            }
            _ => false,
        };
        changed.then_some(InputEvent::ContentChanged)
    }
}
