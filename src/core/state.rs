//! # Application State
//!
//! Core business state for CampusGuide. This module contains domain logic
//! only - no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── screen: Screen                  // checking / login / signup / chat
//! ├── token: Option<String>           // bearer credential (mirrors the token file)
//! ├── username: String                // decoded from the token, cosmetic
//! ├── active_chat_id: Option<ChatId>  // None = new, unsaved conversation
//! ├── recent_turns: RecentTurns       // rolling window sent as chat_history
//! ├── transcript: Transcript          // what's on screen
//! ├── typing_visible: bool            // typing indicator
//! ├── in_flight: Option<RequestId>    // the one outstanding send, if any
//! ├── chats: Vec<ChatSummary>         // sidebar list
//! ├── sidebar_open: bool
//! ├── status_message: String          // status bar text
//! ├── form_error / form_notice        // login & signup feedback
//! └── auth_pending: bool              // login/signup request outstanding
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::time::Duration;

use uuid::Uuid;

use crate::api::{ChatId, ChatSummary};
use crate::core::config::ResolvedConfig;
use crate::core::transcript::Transcript;
use crate::core::turns::RecentTurns;

/// Identifies one send so that its reply can be matched (or dropped).
pub type RequestId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Stored token is being validated.
    Checking,
    Login,
    Signup,
    Chat,
}

pub struct App {
    pub screen: Screen,
    pub token: Option<String>,
    pub username: String,
    pub active_chat_id: Option<ChatId>,
    pub recent_turns: RecentTurns,
    pub transcript: Transcript,
    pub typing_visible: bool,
    pub in_flight: Option<RequestId>,
    pub chats: Vec<ChatSummary>,
    pub sidebar_open: bool,
    pub status_message: String,
    pub form_error: Option<String>,
    pub form_notice: Option<String>,
    pub auth_pending: bool,
    /// Delay before the typing indicator appears for a send.
    pub typing_delay: Duration,
}

impl App {
    pub fn new(typing_delay: Duration, sidebar_open: bool) -> Self {
        Self {
            screen: Screen::Login,
            token: None,
            username: String::new(),
            active_chat_id: None,
            recent_turns: RecentTurns::new(),
            transcript: Transcript::new(),
            typing_visible: false,
            in_flight: None,
            chats: Vec::new(),
            sidebar_open,
            status_message: String::from("Welcome to CampusGuide!"),
            form_error: None,
            form_notice: None,
            auth_pending: false,
            typing_delay,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(config.typing_delay, config.sidebar_open)
    }

    /// A send is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_active(&self, id: &ChatId) -> bool {
        self.active_chat_id.as_ref() == Some(id)
    }

    /// Forget the open conversation (transcript, window, pending reply).
    pub fn clear_conversation(&mut self) {
        self.transcript.clear();
        self.recent_turns.clear();
        self.in_flight = None;
        self.typing_visible = false;
    }

    /// Forget everything tied to the signed-in user.
    pub fn clear_session(&mut self) {
        self.clear_conversation();
        self.token = None;
        self.username.clear();
        self.active_chat_id = None;
        self.chats.clear();
        self.auth_pending = false;
    }
}
