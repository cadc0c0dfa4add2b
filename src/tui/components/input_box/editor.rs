//! Single-line text editing for the InputBox.
//!
//! `LineEditor` owns the buffer and a byte-offset cursor. Column math uses
//! display width so emoji and CJK text keep the cursor where it belongs.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// The field is single-line, so any line break is stored as a space.
fn flatten_line_break(c: char) -> char {
    if c == '\n' || c == '\r' { ' ' } else { c }
}

#[derive(Debug, Default)]
pub(super) struct LineEditor {
    buffer: String,
    /// Byte offset in buffer (0..=buffer.len())
    pos: usize,
}

impl LineEditor {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Inserts text at the cursor. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        let cleaned: String = text.chars().map(flatten_line_break).collect();
        self.buffer.insert_str(self.pos, &cleaned);
        self.pos += cleaned.len();
    }

    pub fn insert_char(&mut self, c: char) {
        let c = flatten_line_break(c);
        self.buffer.insert(self.pos, c);
        self.pos += c.len_utf8();
    }

    pub fn backspace(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        let prev = prev_char_boundary(&self.buffer, self.pos);
        self.buffer.drain(prev..self.pos);
        self.pos = prev;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.pos >= self.buffer.len() {
            return false;
        }
        let next = next_char_boundary(&self.buffer, self.pos);
        self.buffer.drain(self.pos..next);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos = prev_char_boundary(&self.buffer, self.pos);
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.pos >= self.buffer.len() {
            return false;
        }
        self.pos = next_char_boundary(&self.buffer, self.pos);
        true
    }

    pub fn move_home(&mut self) -> bool {
        std::mem::replace(&mut self.pos, 0) != 0
    }

    pub fn move_end(&mut self) -> bool {
        let end = self.buffer.len();
        std::mem::replace(&mut self.pos, end) != end
    }

    /// Empties the buffer and returns its previous contents.
    pub fn take(&mut self) -> String {
        self.pos = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Display columns before the cursor.
    pub fn cursor_column(&self, masked: bool) -> u16 {
        let before = &self.buffer[..self.pos];
        let width = if masked {
            before.chars().count()
        } else {
            before.width()
        };
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

/// Returns the tail of `text` that fits in `width` columns and how many
/// columns were dropped from the front.
pub(super) fn visible_tail(text: &str, width: u16, cursor_column: u16) -> (String, u16) {
    let width = usize::from(width);
    if width == 0 {
        return (String::new(), 0);
    }
    let cursor_column = usize::from(cursor_column);
    // Keep the cursor cell on screen
    let skip = (cursor_column + 1).saturating_sub(width);

    let mut dropped = 0usize;
    let mut shown = String::new();
    let mut used = 0usize;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if dropped < skip {
            dropped += w;
            continue;
        }
        if used + w > width {
            break;
        }
        shown.push(c);
        used += w;
    }
    (shown, u16::try_from(dropped).unwrap_or(u16::MAX))
}
