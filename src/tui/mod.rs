//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values dispatched
//! through the [`Controller`].
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (session check, login in progress, typing indicator):
//!   draws every ~80ms for smooth animation.
//! - **Idle**: sleeps up to 500ms, only redraws on input, on a finished
//!   background job, or on terminal resize. While jobs are outstanding the
//!   poll interval stays short so their results show up promptly.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{info, warn};
use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::api::{ChatId, HttpBackend};
use crate::controller::Controller;
use crate::core::action::Action;
use crate::core::config::ResolvedConfig;
use crate::core::credentials::CredentialStore;
use crate::core::state::{App, Screen};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    AuthFormEvent, AuthFormState, ChatListEvent, ChatListState, Composer, ComposerEvent,
    TranscriptState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// Which chat-screen component receives editing keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Composer,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub transcript: TranscriptState,
    pub composer: Composer,
    pub chat_list: ChatListState,
    pub auth_form: AuthFormState,
    pub focus: Focus,
    // Animation state
    pub spinner_frame: usize,
    // What the last sync saw, to detect screen and conversation changes
    last_screen: Option<Screen>,
    last_chat: Option<ChatId>,
    last_transcript_len: usize,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            transcript: TranscriptState::new(),
            composer: Composer::new(),
            chat_list: ChatListState::new(),
            auth_form: AuthFormState::new(),
            focus: Focus::Composer,
            spinner_frame: 0,
            last_screen: None,
            last_chat: None,
            last_transcript_len: 0,
        }
    }

    /// Bring presentation state in line with `app` before drawing.
    pub fn sync(&mut self, app: &App) {
        if self.last_screen != Some(app.screen) {
            match app.screen {
                Screen::Chat => self.auth_form.clear_password(),
                Screen::Login | Screen::Signup => {
                    self.transcript.reset();
                    self.composer.clear();
                    self.chat_list = ChatListState::new();
                    self.focus = Focus::Composer;
                }
                Screen::Checking => {}
            }
            self.last_screen = Some(app.screen);
        }

        // Switching chats or starting a new one starts at the bottom again.
        // Adopting an id for the open conversation (None -> Some) does not.
        let switched = self.last_chat.is_some() && self.last_chat != app.active_chat_id;
        if switched || app.transcript.len() < self.last_transcript_len {
            self.transcript.reset();
        }
        self.last_chat = app.active_chat_id.clone();
        self.last_transcript_len = app.transcript.len();

        if !app.sidebar_open && self.focus == Focus::Sidebar {
            self.focus = Focus::Composer;
        }
        self.chat_list.focused = self.focus == Focus::Sidebar;
        self.composer.focused = self.focus == Focus::Composer;
        self.composer.waiting = app.is_waiting();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Enable Kitty keyboard protocol unconditionally; terminals without
        // support ignore it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Run the client until the user quits. Must be called inside a tokio
/// runtime; background jobs are spawned onto it.
pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = HttpBackend::new(config.base_url.clone(), config.request_timeout)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let app = App::from_config(&config);
    let mut controller = Controller::new(
        app,
        Arc::new(backend),
        CredentialStore::new(&config.token_path),
    );
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let result = {
        let _terminal_mode_guard = TerminalModeGuard::new()
            .map_err(|e| warn!("Failed to enable terminal modes: {}", e))
            .ok();
        controller.start();
        event_loop(&mut terminal, &mut controller, &mut tui)
    };
    ratatui::restore();
    info!("CampusGuide shutting down");
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    controller: &mut Controller,
    tui: &mut TuiState,
) -> std::io::Result<()> {
    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        tui.sync(controller.app());

        let app = controller.app();
        let animating = app.typing_visible || app.auth_pending || app.screen == Screen::Checking;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_secs_f32() * 8.0) as usize;
            terminal.draw(|f| ui::draw(f, controller.app(), tui))?;
            needs_redraw = false;
        }

        let timeout = if animating || controller.pending_jobs() > 0 {
            ANIMATION_TICK
        } else {
            IDLE_TICK
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            handle_event(controller, tui, event);
            if controller.should_quit() {
                return Ok(());
            }
        }

        if controller.drain() {
            needs_redraw = true;
        }
        if controller.should_quit() {
            return Ok(());
        }
    }
}

fn handle_event(controller: &mut Controller, tui: &mut TuiState, event: TuiEvent) {
    match event {
        // Already flagged for redraw
        TuiEvent::Resize => return,
        TuiEvent::ForceQuit => {
            controller.dispatch(Action::Quit);
            return;
        }
        _ => {}
    }

    match controller.app().screen {
        Screen::Checking => {}
        Screen::Login | Screen::Signup => handle_auth_event(controller, tui, event),
        Screen::Chat => handle_chat_event(controller, tui, event),
    }
}

fn handle_auth_event(controller: &mut Controller, tui: &mut TuiState, event: TuiEvent) {
    let signup = controller.app().screen == Screen::Signup;

    if event == TuiEvent::ToggleAuthMode {
        tui.auth_form.clear_password();
        controller.dispatch(if signup {
            Action::ShowLogin
        } else {
            Action::ShowSignup
        });
        return;
    }

    if let Some(AuthFormEvent::Submit(credentials)) = tui.auth_form.handle_event(&event) {
        controller.dispatch(if signup {
            Action::SubmitSignup(credentials)
        } else {
            Action::SubmitLogin(credentials)
        });
    }
}

fn handle_chat_event(controller: &mut Controller, tui: &mut TuiState, event: TuiEvent) {
    match event {
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.transcript.handle_event(&event);
        }
        TuiEvent::NewChat => {
            controller.dispatch(Action::NewChat);
            tui.focus = Focus::Composer;
        }
        TuiEvent::ToggleSidebar => controller.dispatch(Action::ToggleSidebar),
        TuiEvent::FocusSidebar => {
            if !controller.app().sidebar_open {
                controller.dispatch(Action::ToggleSidebar);
            }
            let app = controller.app();
            let index = app.chats.iter().position(|chat| app.is_active(&chat.id));
            tui.chat_list.sync(app.chats.len());
            tui.chat_list.focus(index);
            tui.focus = Focus::Sidebar;
        }
        TuiEvent::Logout => controller.dispatch(Action::Logout),
        TuiEvent::FeedbackSatisfied => controller.dispatch(Action::SubmitFeedback {
            satisfactory: true,
            request_in_person: false,
        }),
        TuiEvent::FeedbackInPerson => controller.dispatch(Action::SubmitFeedback {
            satisfactory: false,
            request_in_person: true,
        }),
        TuiEvent::ToggleAuthMode => {}
        _ => match tui.focus {
            Focus::Sidebar => match tui.chat_list.handle_event(&event) {
                Some(ChatListEvent::Open(index)) => {
                    if let Some(chat) = controller.app().chats.get(index) {
                        let id = chat.id.clone();
                        controller.dispatch(Action::SelectChat(id));
                    }
                    tui.focus = Focus::Composer;
                }
                Some(ChatListEvent::Leave) => tui.focus = Focus::Composer,
                None => {}
            },
            Focus::Composer => {
                if let Some(ComposerEvent::Submit(text)) = tui.composer.handle_event(&event) {
                    let before = controller.app().in_flight;
                    controller.dispatch(Action::SendMessage(text));
                    let after = controller.app().in_flight;
                    // Keep the text when the send was refused
                    if after.is_some() && after != before {
                        tui.composer.clear();
                        tui.transcript.stick_to_bottom = true;
                    }
                }
            }
        },
    }
}
