//! # Chat List Component
//!
//! Sidebar listing the user's saved conversations, newest first as the
//! server orders them. Toggled with Ctrl+B, focused with Ctrl+O.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ChatListState` lives in `TuiState` (cursor, focus)
//! - `ChatList` is created each frame with borrowed props

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::api::{ChatId, ChatSummary};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Cursor and focus for the sidebar.
#[derive(Default)]
pub struct ChatListState {
    pub focused: bool,
    pub list_state: ListState,
    /// Number of chats at the last sync; bounds the cursor.
    len: usize,
}

impl ChatListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the cursor inside a list of `len` chats.
    pub fn sync(&mut self, len: usize) {
        self.len = len;
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None if self.focused => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    /// Take focus with the cursor on `index` (or the top).
    pub fn focus(&mut self, index: Option<usize>) {
        self.focused = true;
        self.list_state.select(index.or(Some(0)));
        self.sync(self.len);
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatListEvent {
    /// Open the chat at this index.
    Open(usize),
    /// Hand focus back to the input box.
    Leave,
}

impl EventHandler for ChatListState {
    type Event = ChatListEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape | TuiEvent::Tab => {
                self.focused = false;
                Some(ChatListEvent::Leave)
            }
            TuiEvent::CursorUp => {
                if self.len > 0 {
                    let i = self.selected().unwrap_or(0).saturating_sub(1);
                    self.list_state.select(Some(i));
                }
                None
            }
            TuiEvent::CursorDown => {
                if self.len > 0 {
                    let i = self.selected().map_or(0, |i| (i + 1).min(self.len - 1));
                    self.list_state.select(Some(i));
                }
                None
            }
            TuiEvent::Submit => {
                let index = self.selected().filter(|i| *i < self.len)?;
                self.focused = false;
                Some(ChatListEvent::Open(index))
            }
            _ => None,
        }
    }
}

pub struct ChatList<'a> {
    pub chats: &'a [ChatSummary],
    pub active: Option<&'a ChatId>,
    pub state: &'a mut ChatListState,
}

impl<'a> ChatList<'a> {
    pub fn new(
        chats: &'a [ChatSummary],
        active: Option<&'a ChatId>,
        state: &'a mut ChatListState,
    ) -> Self {
        Self {
            chats,
            active,
            state,
        }
    }
}

impl Component for ChatList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync(self.chats.len());

        let border = if self.state.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let help = if self.state.focused {
            " ↑↓ Enter Esc "
        } else {
            " Ctrl+O "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Chats ")
            .title_bottom(Line::from(help).centered())
            .padding(Padding::horizontal(1));

        if self.chats.is_empty() {
            let empty = Paragraph::new("No chats yet.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        // borders + padding
        let inner_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .chats
            .iter()
            .map(|chat| {
                let is_active = self.active == Some(&chat.id);
                let marker = if is_active { "▸ " } else { "  " };
                let date = chat.created_label().unwrap_or_default();
                let title_width = inner_width
                    .saturating_sub(marker.len())
                    .saturating_sub(if date.is_empty() { 0 } else { date.len() + 1 });
                let title = truncate(&chat.display_title(), title_width);
                let padded = format!("{title:<title_width$}");

                let style = if is_active {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let mut spans = vec![Span::styled(marker, style), Span::styled(padded, style)];
                if !date.is_empty() {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(date, Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let highlight = if self.state.focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let list = List::new(items).block(block).highlight_style(highlight);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// Cut `s` to `max_width` terminal columns, ending in "…" when shortened.
fn truncate(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        width += w;
        out.push(c);
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::summary;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut state = ChatListState::new();
        state.sync(2);
        state.focus(None);
        state.handle_event(&TuiEvent::CursorUp);
        assert_eq!(state.selected(), Some(0));
        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.selected(), Some(1));
    }

    #[test]
    fn test_enter_opens_selected_and_drops_focus() {
        let mut state = ChatListState::new();
        state.sync(3);
        state.focus(Some(2));
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(ChatListEvent::Open(2))
        );
        assert!(!state.focused);
    }

    #[test]
    fn test_enter_on_empty_list_does_nothing() {
        let mut state = ChatListState::new();
        state.sync(0);
        state.focus(None);
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_escape_leaves() {
        let mut state = ChatListState::new();
        state.focus(None);
        assert_eq!(
            state.handle_event(&TuiEvent::Escape),
            Some(ChatListEvent::Leave)
        );
        assert!(!state.focused);
    }

    #[test]
    fn test_shrinking_list_clamps_cursor() {
        let mut state = ChatListState::new();
        state.sync(5);
        state.focus(Some(4));
        state.sync(2);
        assert_eq!(state.selected(), Some(1));
    }

    #[test]
    fn test_truncate_respects_width() {
        assert_eq!(truncate("Library", 10), "Library");
        assert_eq!(truncate("Financial aid deadlines", 10), "Financial…");
    }

    #[test]
    fn test_render_marks_active_chat() {
        let chats = vec![summary(1, Some("Parking permits")), summary(2, None)];
        let active = ChatId::Number(2);
        let mut state = ChatListState::new();
        let backend = TestBackend::new(30, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                ChatList::new(&chats, Some(&active), &mut state).render(f, f.area());
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Parking permits"));
        assert!(text.contains("▸ Chat 2"));
    }
}
