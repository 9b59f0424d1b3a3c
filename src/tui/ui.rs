//! Frame layout: picks the screen for `app.screen` and places components.
//!
//! ```text
//! ┌ CampusGuide · alice | status ─────────────────────┐  1 row
//! │ Chats     │ transcript                            │
//! │ (sidebar) │                                       │
//! ├───────────┴───────────────────────────────────────┤
//! │ composer (3..7 rows)                              │
//! └───────────────────────────────────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{App, Screen};
use crate::tui::component::Component;
use crate::tui::components::{AuthForm, AuthMode, ChatList, TitleBar, TranscriptView};
use crate::tui::{Focus, TuiState};

const SIDEBAR_WIDTH: u16 = 28;
/// Below this width the sidebar is not drawn even when open.
const MIN_WIDTH_FOR_SIDEBAR: u16 = 60;
const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub fn draw(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    let area = frame.area();
    match app.screen {
        Screen::Checking => draw_checking(frame, area, tui.spinner_frame),
        Screen::Login | Screen::Signup => {
            let mode = if app.screen == Screen::Signup {
                AuthMode::Signup
            } else {
                AuthMode::Login
            };
            AuthForm {
                mode,
                error: app.form_error.as_deref(),
                notice: app.form_notice.as_deref(),
                pending: app.auth_pending,
                state: &tui.auth_form,
            }
            .render(frame, area);
        }
        Screen::Chat => draw_chat(frame, area, app, tui),
    }
}

fn draw_checking(frame: &mut Frame, area: Rect, spinner_frame: usize) {
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    let spinner = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
    let line = Line::from(vec![
        Span::styled(spinner, Style::default().fg(Color::Cyan)),
        Span::raw(" Checking session..."),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
}

fn draw_chat(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let composer_height = tui.composer.height(area.width);
    let [title_area, body_area, composer_area] =
        Layout::vertical([Length(1), Min(0), Length(composer_height)]).areas(area);

    let show_sidebar = app.sidebar_open && area.width >= MIN_WIDTH_FOR_SIDEBAR;
    let transcript_area = if show_sidebar {
        let [sidebar_area, transcript_area] =
            Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(body_area);
        tui.chat_list.focused = tui.focus == Focus::Sidebar;
        ChatList::new(&app.chats, app.active_chat_id.as_ref(), &mut tui.chat_list)
            .render(frame, sidebar_area);
        transcript_area
    } else {
        body_area
    };

    TranscriptView::new(
        &app.transcript,
        app.typing_visible,
        tui.spinner_frame,
        &mut tui.transcript,
    )
    .render(frame, transcript_area);

    // After the transcript so "↓ New" reflects this frame's scroll position
    TitleBar::new(
        &app.username,
        &app.status_message,
        tui.transcript.has_unseen_content,
    )
    .render(frame, title_area);

    tui.composer.render(frame, composer_area);
}
