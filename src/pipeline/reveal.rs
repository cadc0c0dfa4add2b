//! Simulated streaming: shows an already-complete reply word by word.

use std::time::Duration;

/// Appended to every intermediate frame.
pub const CURSOR_GLYPH: char = '▌';

/// Where a turn's output goes while it is being shown.
pub trait RevealSink: Send {
    /// Replaces the in-progress reply with `frame`.
    fn show(&mut self, frame: &str);

    /// Shows a failure in place of the reply.
    fn error(&mut self, message: &str);
}

/// Reveals `text` one whitespace-separated token at a time, pausing `pace`
/// after each frame. Returns the final frame (tokens joined by single spaces,
/// with a trailing space).
///
/// Line breaks are not kept in frames. Callers record the formatted text.
pub async fn reveal(text: &str, pace: Duration, sink: &mut dyn RevealSink) -> String {
    let mut buffer = String::with_capacity(text.len() + 1);

    for token in text.split_whitespace() {
        buffer.push_str(token);
        buffer.push(' ');
        sink.show(&format!("{buffer}{CURSOR_GLYPH}"));
        if !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
    }

    sink.show(&buffer);
    buffer
}
