use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Global shortcuts (mapped to core actions by the event loop)
    ForceQuit,     // Ctrl+C
    NewChat,       // Ctrl+N
    ToggleSidebar, // Ctrl+B
    FocusSidebar,  // Ctrl+O
    Logout,        // Ctrl+L
    FeedbackSatisfied, // Ctrl+Y
    FeedbackInPerson,  // Ctrl+F
    ToggleAuthMode,    // Ctrl+S, login <-> signup

    // Editing and navigation (routed to the focused component)
    Submit,
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    CursorUp,
    CursorDown,
    Tab,
    Escape,

    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    Resize,
}

/// Poll for an event with timeout.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            log::warn!("Event poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(ev) => translate(ev),
        Err(e) => {
            log::warn!("Event read failed: {}", e);
            None
        }
    }
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Map a raw crossterm event. Key releases and unbound keys yield None.
pub fn translate(ev: Event) -> Option<TuiEvent> {
    match ev {
        Event::Key(key_event) => translate_key(key_event),
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn translate_key(key_event: KeyEvent) -> Option<TuiEvent> {
    // Keyboard enhancement reports releases too
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code,
        key_event.modifiers
    );
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && let KeyCode::Char(c) = key_event.code
    {
        return match c.to_ascii_lowercase() {
            'c' => Some(TuiEvent::ForceQuit),
            'n' => Some(TuiEvent::NewChat),
            'b' => Some(TuiEvent::ToggleSidebar),
            'o' => Some(TuiEvent::FocusSidebar),
            'l' => Some(TuiEvent::Logout),
            'y' => Some(TuiEvent::FeedbackSatisfied),
            'f' => Some(TuiEvent::FeedbackInPerson),
            's' => Some(TuiEvent::ToggleAuthMode),
            // Ctrl+J inserts newline (ASCII LF; Ctrl+Enter sends this in most terminals)
            'j' => Some(TuiEvent::InputChar('\n')),
            _ => None,
        };
    }
    match key_event.code {
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Tab | KeyCode::BackTab => Some(TuiEvent::Tab),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
