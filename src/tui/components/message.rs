use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::inference::Role;
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Pulse intensity above which the border of a pending reply turns BOLD.
const PULSE_BOLD_THRESHOLD: f32 = 0.6;
/// Pulse intensity above which the border of a pending reply loses DIM.
const PULSE_NORMAL_THRESHOLD: f32 = 0.2;

/// One chat bubble.
///
/// Created fresh each frame. `is_hovered` comes from the parent `MessageList`.
/// User messages are green, bot replies blue; hovered bubbles get a bright
/// border, a reply still being revealed pulses.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub role: Role,
    pub content: &'a str,
    pub is_hovered: bool,
    /// 0.0 to 1.0 while the reply is being revealed, 0.0 otherwise
    pub pulse_intensity: f32,
}

impl<'a> Message<'a> {
    pub fn new(role: Role, content: &'a str, is_hovered: bool, pulse_intensity: f32) -> Self {
        Self {
            role,
            content,
            is_hovered,
            pulse_intensity,
        }
    }

    /// Predicts the rendered height for `width` without rendering.
    ///
    /// The wrapping options must match Ratatui's `Paragraph` wrapping so the
    /// scroll view gets the same height the widget later fills.
    pub fn calculate_height(content: &str, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }

        let content = content.trim();
        if content.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let options = textwrap::Options::new(content_width as usize)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);

        let lines = textwrap::wrap(content, options);
        (lines.len() as u16).max(1) + VERTICAL_OVERHEAD
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "sneaker bot",
        Role::System => "system",
    }
}

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Assistant => Style::default().fg(Color::Blue),
        Role::System => Style::default().fg(Color::Yellow),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = role_style(self.role);

        let mut border_style = if self.is_hovered {
            style
        } else {
            style.add_modifier(Modifier::DIM)
        };

        // Three-phase breathing: DIM → normal → BOLD
        if self.pulse_intensity > PULSE_BOLD_THRESHOLD {
            border_style = border_style
                .remove_modifier(Modifier::DIM)
                .add_modifier(Modifier::BOLD);
        } else if self.pulse_intensity > PULSE_NORMAL_THRESHOLD {
            border_style = border_style.remove_modifier(Modifier::DIM);
        }

        let block = Block::bordered()
            .title(role_label(self.role))
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.content.trim())
            .style(style)
            .wrap(Wrap { trim: true })
            .render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
