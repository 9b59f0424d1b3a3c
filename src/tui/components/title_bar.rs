//! # TitleBar Component
//!
//! One-line header above the chat screen: app name, signed-in user, the
//! current status message, and a "↓ New" hint when the transcript has
//! content below the scroll position.
//!
//! Stateless. All three pieces of data are props:
//! - `username`, `status_message`: core `App` state
//! - `has_unseen_content`: TUI scroll state
//!
//! ```text
//! CampusGuide · alice | Signed in as alice | ↓ New
//! ```

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar<'a> {
    pub username: &'a str,
    pub status_message: &'a str,
    pub has_unseen_content: bool,
}

impl<'a> TitleBar<'a> {
    pub fn new(username: &'a str, status_message: &'a str, has_unseen_content: bool) -> Self {
        Self {
            username,
            status_message,
            has_unseen_content,
        }
    }

    fn line(&self) -> Line<'static> {
        let dim = Style::default().fg(Color::DarkGray);
        let mut spans = vec![Span::styled(
            "CampusGuide",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )];
        if !self.username.is_empty() {
            spans.push(Span::styled(" · ", dim));
            spans.push(Span::raw(self.username.to_string()));
        }
        if !self.status_message.is_empty() {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::raw(self.status_message.to_string()));
        }
        if self.has_unseen_content {
            spans.push(Span::styled(" | ", dim));
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(mut title_bar: TitleBar<'_>) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_shows_user_and_status() {
        let text = rendered(TitleBar::new("alice", "Signed in as alice", false));
        assert!(text.contains("CampusGuide"));
        assert!(text.contains("alice"));
        assert!(text.contains("Signed in as alice"));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let text = rendered(TitleBar::new("alice", "", true));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_without_user_or_status() {
        let text = rendered(TitleBar::new("", "", false));
        assert!(text.starts_with("CampusGuide"));
        assert!(!text.contains('|'));
    }
}
