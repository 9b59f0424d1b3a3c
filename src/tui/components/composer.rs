//! # Composer Component
//!
//! The message input at the bottom of the chat screen.
//!
//! Text is hard-wrapped at the inner width by display columns (not words),
//! which keeps the byte offset → screen position mapping exact. Grows up to
//! [`MAX_VISIBLE_ROWS`] rows, then scrolls internally to keep the cursor in
//! view.
//!
//! Submitting does not clear the buffer: the event loop calls
//! [`Composer::clear`] once the message was actually accepted, so a send
//! rejected while a reply is pending keeps the user's text.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const MAX_VISIBLE_ROWS: u16 = 5;
/// Borders (2) + horizontal padding (2)
const HORIZONTAL_OVERHEAD: u16 = 4;
const VERTICAL_OVERHEAD: u16 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    Submit(String),
    Changed,
}

pub struct Composer {
    buffer: String,
    /// Byte offset, always on a char boundary.
    cursor: usize,
    /// First visible row.
    scroll: usize,
    /// Width of the last render, used for vertical movement.
    last_width: u16,
    /// Prop: a reply is pending.
    pub waiting: bool,
    /// Prop: keystrokes go here (false while the sidebar has focus).
    pub focused: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            last_width: 80,
            waiting: false,
            focused: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Rows needed for the current text at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let rows = rows(&self.buffer, inner_width(width)).len() as u16;
        rows.clamp(1, MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    fn insert(&mut self, s: &str) {
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// (row, column) of the cursor in the wrapped layout.
    fn cursor_cell(&self, width: usize) -> (usize, usize) {
        let rows = rows(&self.buffer, width);
        let row = rows
            .iter()
            .rposition(|r| r.start <= self.cursor)
            .unwrap_or(0);
        let col = self.buffer[rows[row].start..self.cursor].width();
        (row, col)
    }

    fn move_vertically(&mut self, down: bool) -> bool {
        let width = inner_width(self.last_width);
        let rows = rows(&self.buffer, width);
        let (row, col) = self.cursor_cell(width);
        let target = match (down, row) {
            (false, 0) => return false,
            (false, r) => r - 1,
            (true, r) if r + 1 >= rows.len() => return false,
            (true, r) => r + 1,
        };
        let range = rows[target].clone();
        let mut pos = range.start;
        let mut used = 0;
        for (i, c) in self.buffer[range.clone()].char_indices() {
            let w = c.width().unwrap_or(0);
            if used + w > col {
                break;
            }
            used += w;
            pos = range.start + i + c.len_utf8();
        }
        self.cursor = pos;
        true
    }
}

fn inner_width(width: u16) -> usize {
    width.saturating_sub(HORIZONTAL_OVERHEAD).max(1) as usize
}

/// Byte ranges of the visual rows of `text`, hard-wrapped at `width` columns.
/// Newlines end a row and belong to no row.
fn rows(text: &str, width: usize) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut col = 0;
    for (i, c) in text.char_indices() {
        if c == '\n' {
            rows.push(start..i);
            start = i + 1;
            col = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if col + w > width && col > 0 {
            rows.push(start..i);
            start = i;
            col = 0;
        }
        col += w;
    }
    rows.push(start..text.len());
    rows
}

fn prev_boundary(s: &str, pos: usize) -> usize {
    s[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

fn next_boundary(s: &str, pos: usize) -> usize {
    s[pos..]
        .chars()
        .next()
        .map_or(s.len(), |c| pos + c.len_utf8())
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        let width = inner_width(area.width);
        let all_rows = rows(&self.buffer, width);
        let (cursor_row, cursor_col) = self.cursor_cell(width);

        let visible = (area.height.saturating_sub(VERTICAL_OVERHEAD) as usize).max(1);
        if cursor_row < self.scroll {
            self.scroll = cursor_row;
        } else if cursor_row >= self.scroll + visible {
            self.scroll = cursor_row + 1 - visible;
        }

        let lines: Vec<Line> = all_rows
            .iter()
            .skip(self.scroll)
            .take(visible)
            .map(|r| Line::raw(&self.buffer[r.clone()]))
            .collect();

        let title = if self.waiting {
            " Waiting for reply… "
        } else {
            " Message "
        };
        let border = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(title)
            .title_bottom(
                Line::from(" Enter send · Ctrl+N new · Ctrl+B chats · Ctrl+Y/F feedback · Ctrl+L logout ")
                    .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM))
                    .right_aligned(),
            )
            .padding(Padding::horizontal(1));

        frame.render_widget(Paragraph::new(lines).block(block), area);

        if self.focused {
            let x = area.x + 2 + (cursor_col.min(width.saturating_sub(1)) as u16);
            let y = area.y + 1 + (cursor_row - self.scroll) as u16;
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
            }
            TuiEvent::Paste(text) => self.insert(&text.replace("\r\n", "\n")),
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_boundary(&self.buffer, self.cursor);
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = next_boundary(&self.buffer, self.cursor);
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
            }
            TuiEvent::CursorUp => {
                if !self.move_vertically(false) {
                    return None;
                }
            }
            TuiEvent::CursorDown => {
                if !self.move_vertically(true) {
                    return None;
                }
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                return Some(ComposerEvent::Submit(self.buffer.clone()));
            }
            _ => return None,
        }
        Some(ComposerEvent::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> Composer {
        let mut composer = Composer::new();
        for c in text.chars() {
            composer.handle_event(&TuiEvent::InputChar(c));
        }
        composer
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut composer = typed("héllo");
        assert_eq!(composer.text(), "héllo");
        composer.handle_event(&TuiEvent::CursorLeft);
        composer.handle_event(&TuiEvent::CursorLeft);
        composer.handle_event(&TuiEvent::CursorLeft);
        composer.handle_event(&TuiEvent::Backspace);
        assert_eq!(composer.text(), "hllo");
        composer.handle_event(&TuiEvent::Delete);
        assert_eq!(composer.text(), "hlo");
    }

    #[test]
    fn test_submit_keeps_text_until_cleared() {
        let mut composer = typed("  Where is the gym?  ");
        assert_eq!(
            composer.handle_event(&TuiEvent::Submit),
            Some(ComposerEvent::Submit("  Where is the gym?  ".to_string()))
        );
        assert_eq!(composer.text(), "  Where is the gym?  ");
        composer.clear();
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn test_blank_submit_is_swallowed() {
        let mut composer = typed("   ");
        assert_eq!(composer.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_rows_wrap_by_width_and_newline() {
        assert_eq!(rows("abcdef", 4), vec![0..4, 4..6]);
        assert_eq!(rows("ab\ncd", 4), vec![0..2, 3..5]);
        assert_eq!(rows("", 4), vec![0..0]);
        // Wide chars never split across rows
        assert_eq!(rows("日本語", 4), vec![0..6, 6..9]);
    }

    #[test]
    fn test_height_grows_then_caps() {
        let composer = typed("a");
        assert_eq!(composer.height(20), 3);
        let composer = typed(&"x".repeat(16 * 10));
        assert_eq!(composer.height(20), MAX_VISIBLE_ROWS + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_home_end_work_per_line() {
        let mut composer = typed("one\ntwo");
        composer.handle_event(&TuiEvent::CursorHome);
        composer.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(composer.text(), "one\n>two");
        composer.handle_event(&TuiEvent::CursorUp);
        composer.handle_event(&TuiEvent::CursorEnd);
        composer.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(composer.text(), "one!\n>two");
    }

    #[test]
    fn test_render_shows_waiting_title() {
        let backend = TestBackend::new(100, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut composer = typed("hi");
        composer.waiting = true;
        terminal
            .draw(|f| {
                composer.render(f, f.area());
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Waiting for reply"));
        assert!(text.contains("hi"));
    }
}
