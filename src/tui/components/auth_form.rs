//! # AuthForm Component
//!
//! Centered login / signup card shown until the user is signed in.
//!
//! Two single-line fields; Tab switches between them, Enter submits, Ctrl+S
//! flips between login and signup (handled by the event loop since it is a
//! core action). Validation and the resulting error text live in the core;
//! this component only shows `form_error` / `form_notice` as props.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::api::Credentials;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const CARD_WIDTH: u16 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    fn title(self) -> &'static str {
        match self {
            AuthMode::Login => " Log in ",
            AuthMode::Signup => " Sign up ",
        }
    }

    fn switch_hint(self) -> &'static str {
        match self {
            AuthMode::Login => "No account? Ctrl+S to sign up",
            AuthMode::Signup => "Have an account? Ctrl+S to log in",
        }
    }
}

#[derive(Default)]
pub struct AuthFormState {
    pub username: String,
    pub password: String,
    pub field: AuthField,
}

impl AuthFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the password (after a mode switch or a sign-in).
    pub fn clear_password(&mut self) {
        self.password.clear();
        if self.username.is_empty() {
            self.field = AuthField::Username;
        }
    }

    fn active(&mut self) -> &mut String {
        match self.field {
            AuthField::Username => &mut self.username,
            AuthField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum AuthFormEvent {
    Submit(Credentials),
}

impl EventHandler for AuthFormState {
    type Event = AuthFormEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) if *c != '\n' => self.active().push(*c),
            TuiEvent::Paste(text) => {
                let line = text.lines().next().unwrap_or_default().to_string();
                self.active().push_str(&line);
            }
            TuiEvent::Backspace => {
                self.active().pop();
            }
            TuiEvent::Tab | TuiEvent::CursorDown | TuiEvent::CursorUp => {
                self.field = match self.field {
                    AuthField::Username => AuthField::Password,
                    AuthField::Password => AuthField::Username,
                };
            }
            // Enter on a blank password moves there first
            TuiEvent::Submit
                if self.field == AuthField::Username
                    && self.password.is_empty()
                    && !self.username.trim().is_empty() =>
            {
                self.field = AuthField::Password;
            }
            TuiEvent::Submit => {
                return Some(AuthFormEvent::Submit(Credentials::new(
                    self.username.clone(),
                    self.password.clone(),
                )));
            }
            _ => {}
        }
        None
    }
}

pub struct AuthForm<'a> {
    pub mode: AuthMode,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
    pub pending: bool,
    pub state: &'a AuthFormState,
}

impl AuthForm<'_> {
    fn field_line(&self, label: &str, value: String, field: AuthField) -> Line<'static> {
        let active = self.state.field == field;
        let label_style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!("{label:<10}"), label_style),
            Span::styled(value, Style::default().add_modifier(Modifier::UNDERLINED)),
        ])
    }

    fn message_lines(&self, width: usize) -> Vec<Line<'static>> {
        let (text, style) = match (self.error, self.notice) {
            (Some(error), _) => (error, Style::default().fg(Color::Red)),
            (None, Some(notice)) => (notice, Style::default().fg(Color::Green)),
            (None, None) if self.pending => ("Please wait…", Style::default().fg(Color::Yellow)),
            (None, None) => return Vec::new(),
        };
        textwrap::wrap(text, width.max(1))
            .into_iter()
            .map(|l| Line::from(Span::styled(l.into_owned(), style)))
            .collect()
    }
}

impl Component for AuthForm<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = CARD_WIDTH.min(area.width);
        // borders + padding
        let inner = width.saturating_sub(4) as usize;
        let messages = self.message_lines(inner);
        // title line, blank, two fields, blank, messages, blank, hint
        let height = (7 + messages.len() as u16 + 2).min(area.height);

        let [_, column, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [_, card, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .areas(column);

        let masked = "•".repeat(self.state.password.chars().count());
        let mut lines = vec![
            Line::from(Span::styled(
                "CampusGuide",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::default(),
            self.field_line("Username", self.state.username.clone(), AuthField::Username),
            self.field_line("Password", masked.clone(), AuthField::Password),
            Line::default(),
        ];
        lines.extend(messages);
        lines.push(Line::default());
        lines.push(
            Line::from(Span::styled(
                self.mode.switch_hint(),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
        );

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(self.mode.title())
            .padding(Padding::horizontal(1));

        frame.render_widget(Clear, card);
        frame.render_widget(Paragraph::new(lines).block(block), card);

        // Cursor at the end of the active field
        let (row, value_width) = match self.state.field {
            AuthField::Username => (3, self.state.username.width()),
            AuthField::Password => (4, masked.width()),
        };
        let value_width = u16::try_from(value_width).unwrap_or(u16::MAX);
        let x = card.x.saturating_add(12).saturating_add(value_width);
        if x < card.right().saturating_sub(1) && row < card.height {
            frame.set_cursor_position((x, card.y + row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_str(state: &mut AuthFormState, s: &str) {
        for c in s.chars() {
            state.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn test_enter_moves_to_password_then_submits() {
        let mut state = AuthFormState::new();
        type_str(&mut state, "alice");
        assert_eq!(state.handle_event(&TuiEvent::Submit), None);
        assert_eq!(state.field, AuthField::Password);
        type_str(&mut state, "s3cret");
        assert_eq!(
            state.handle_event(&TuiEvent::Submit),
            Some(AuthFormEvent::Submit(Credentials::new("alice", "s3cret")))
        );
    }

    #[test]
    fn test_empty_form_still_submits_for_validation() {
        let mut state = AuthFormState::new();
        assert!(matches!(
            state.handle_event(&TuiEvent::Submit),
            Some(AuthFormEvent::Submit(_))
        ));
    }

    #[test]
    fn test_tab_switches_field_and_backspace_edits_it() {
        let mut state = AuthFormState::new();
        type_str(&mut state, "bob");
        state.handle_event(&TuiEvent::Tab);
        type_str(&mut state, "pw");
        state.handle_event(&TuiEvent::Backspace);
        assert_eq!(state.username, "bob");
        assert_eq!(state.password, "p");
    }

    #[test]
    fn test_password_is_masked_and_error_shown() {
        let mut state = AuthFormState::new();
        type_str(&mut state, "carol");
        state.handle_event(&TuiEvent::Tab);
        type_str(&mut state, "hunter2");

        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                AuthForm {
                    mode: AuthMode::Login,
                    error: Some("Incorrect username or password"),
                    notice: None,
                    pending: false,
                    state: &state,
                }
                .render(f, f.area());
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("carol"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("•••••••"));
        assert!(text.contains("Incorrect username"));
        assert!(text.contains("Log in"));
    }

    #[test]
    fn test_huge_pasted_username_renders() {
        let mut state = AuthFormState::new();
        state.handle_event(&TuiEvent::Paste("x".repeat(65_530)));

        let backend = TestBackend::new(60, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                AuthForm {
                    mode: AuthMode::Login,
                    error: None,
                    notice: None,
                    pending: false,
                    state: &state,
                }
                .render(f, f.area());
            })
            .unwrap();
        assert_eq!(state.username.len(), 65_530);
    }
}
