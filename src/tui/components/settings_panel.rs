//! # SettingsPanel Component
//!
//! Right-hand sidebar with the request settings and the keys that change them.
//! Stateless; every frame gets fresh props from `App`.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Wrap};

use crate::core::config::RequestConfig;
use crate::tui::component::Component;

pub const PANEL_WIDTH: u16 = 34;

const KEY_HINTS: &[(&str, &str)] = &[
    ("Enter", "send"),
    ("Ctrl+K", "API key"),
    ("F2/F3", "temperature −/+"),
    ("F4/F5", "retries −/+"),
    ("Ctrl+L", "clear chat"),
    ("PgUp/PgDn", "scroll"),
    ("Esc", "quit"),
];

pub struct SettingsPanel {
    /// Masked key, empty when none is set
    pub credential: String,
    pub model: &'static str,
    pub temperature: f32,
    pub max_retries: u8,
    pub topic_filter: bool,
}

impl SettingsPanel {
    pub fn from_config(config: &RequestConfig, topic_filter: bool) -> Self {
        Self {
            credential: config.credential().masked(),
            model: config.model.id(),
            temperature: config.temperature(),
            max_retries: config.max_retries(),
            topic_filter,
        }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let hint = Style::default().fg(Color::DarkGray);

        let key_line = if self.credential.is_empty() {
            Line::from(vec![
                Span::styled("🔑 API Key: ", label),
                Span::styled("not set", Style::default().fg(Color::Red)),
            ])
        } else {
            Line::from(vec![
                Span::styled("🔑 API Key: ", label),
                Span::styled(self.credential.as_str(), Style::default().fg(Color::Green)),
            ])
        };

        let mut lines = vec![
            key_line,
            Line::from(vec![
                Span::styled("🤖 Model: ", label),
                Span::raw(self.model),
            ]),
            Line::from(vec![
                Span::styled("🎨 Creativity: ", label),
                Span::raw(format!("{:.1}", self.temperature)),
            ]),
            Line::from(vec![
                Span::styled("🔄 Max Retries: ", label),
                Span::raw(self.max_retries.to_string()),
            ]),
            Line::from(vec![
                Span::styled("👟 Topic filter: ", label),
                Span::raw(if self.topic_filter { "on" } else { "off" }),
            ]),
            Line::default(),
            Line::styled("Get a key: openrouter.ai/keys", hint),
            Line::default(),
        ];

        lines.extend(KEY_HINTS.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:<10}"), Style::default().fg(Color::Cyan)),
                Span::styled(*action, hint),
            ])
        }));
        lines
    }
}

impl Component for SettingsPanel {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(Style::default().add_modifier(Modifier::DIM))
            .title("⚙️ Bot Settings")
            .padding(Padding::horizontal(1));

        let paragraph = Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Credential;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(panel: &mut SettingsPanel) -> String {
        let backend = TestBackend::new(PANEL_WIDTH, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                panel.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_panel_shows_missing_key() {
        let mut panel = SettingsPanel::from_config(&RequestConfig::default(), false);
        let text = render_text(&mut panel);
        assert!(text.contains("not set"));
        assert!(text.contains("0.7"));
        assert!(text.contains("off"));
    }

    #[test]
    fn test_panel_masks_key() {
        let mut config = RequestConfig::default();
        config.set_credential(Credential::new("sk-or-v1-abcdefgh9876"));
        let mut panel = SettingsPanel::from_config(&config, true);

        assert_eq!(panel.credential, "sk-o…9876");
        let text = render_text(&mut panel);
        assert!(!text.contains("abcdefgh"));
        assert!(text.contains("on"));
    }
}
