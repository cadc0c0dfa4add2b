use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{
    INPUT_HEIGHT, MessageList, PANEL_WIDTH, SettingsPanel, TitleBar,
};
use crate::tui::{InputMode, TuiState};

/// Height of the error banner, borders included.
const ERROR_HEIGHT: u16 = 3;
/// Below this width the settings panel is hidden.
const MIN_WIDTH_FOR_PANEL: u16 = 80;

struct Areas {
    title: Rect,
    error: Option<Rect>,
    messages: Rect,
    input: Rect,
    panel: Option<Rect>,
}

fn split_areas(area: Rect, has_error: bool) -> Areas {
    use Constraint::{Length, Min};

    let [title, body] = Layout::vertical([Length(1), Min(0)]).areas(area);

    let (main, panel) = if body.width >= MIN_WIDTH_FOR_PANEL {
        let [main, panel] = Layout::horizontal([Min(0), Length(PANEL_WIDTH)]).areas(body);
        (main, Some(panel))
    } else {
        (body, None)
    };

    let error_height = if has_error { ERROR_HEIGHT } else { 0 };
    let [error, messages, input] =
        Layout::vertical([Length(error_height), Min(0), Length(INPUT_HEIGHT)]).areas(main);

    Areas {
        title,
        error: has_error.then_some(error),
        messages,
        input,
        panel,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let areas = split_areas(frame.area(), app.error.is_some());

    let mut title_bar = TitleBar::new(
        app.session.config.model.id().to_string(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content(),
        app.is_loading,
    );
    title_bar.render(frame, areas.title);

    if let (Some(area), Some(message)) = (areas.error, app.error.as_deref()) {
        draw_error_banner(frame, area, message);
    }

    let conversation = app.session.conversation();
    MessageList::new(
        &mut tui.message_list,
        conversation.messages(),
        conversation.epoch(),
        app.reveal.as_deref(),
        tui.pulse_value,
    )
    .render(frame, areas.messages);

    tui.input_box.masked = tui.input_mode == InputMode::Credential;
    tui.input_box.disabled = app.is_loading && tui.input_mode == InputMode::Chat;
    tui.input_box.render(frame, areas.input);

    if let Some(panel_area) = areas.panel {
        SettingsPanel::from_config(&app.session.config, app.topic_filter).render(frame, panel_area);
    }
}

fn draw_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let style = Style::default().fg(Color::Red);
    let banner = Paragraph::new(message)
        .block(
            Block::bordered()
                .border_type(ratatui::widgets::BorderType::Rounded)
                .border_style(style.add_modifier(Modifier::BOLD))
                .title("Error"),
        )
        .style(style)
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}

/// Given a screen Y coordinate, find which message index (if any) is under it.
pub fn hit_test_message(
    screen_y: u16,
    frame_area: Rect,
    has_error: bool,
    scroll_offset_y: u16,
    prefix_heights: &[u16],
) -> Option<usize> {
    let messages = split_areas(frame_area, has_error).messages;
    if screen_y < messages.y || screen_y >= messages.y + messages.height {
        return None;
    }

    let content_y = (screen_y - messages.y) + scroll_offset_y;
    let idx = prefix_heights.partition_point(|&end| end <= content_y);
    (idx < prefix_heights.len()).then_some(idx)
}
