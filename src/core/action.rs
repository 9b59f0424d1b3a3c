//! # Actions
//!
//! Everything that can happen in CampusGuide becomes an `Action`.
//! User presses Enter? That's `Action::SendMessage(text)`.
//! The server answers? That's `Action::ReplyReceived { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and returns an `Effect` describing the I/O to perform next.
//! No side effects here. I/O happens in the controller.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Every effect that talks to the server reports back with exactly one
//! action. Replies carry the request id or chat id they answer, so a reply
//! that no longer matches the state (new chat, other chat, logged out) is
//! dropped instead of landing in the wrong conversation.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::api::{
    ApiError, ChatId, ChatReply, ChatRequest, ChatSummary, Credentials, FeedbackReply,
    FeedbackRequest, SignupReply, StoredMessage, TokenResponse,
};
use crate::core::state::{App, RequestId, Screen};
use crate::core::token;

/// Bot message when the server failed without saying why.
pub const SEND_FALLBACK: &str = "Sorry, something went wrong. Please try again.";
/// Bot message when the server could not be reached at all.
pub const COMMUNICATION_ERROR: &str = "Error: Could not communicate with the server.";
pub const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
pub const SIGNUP_FALLBACK: &str = "Signup failed. Please try again.";
pub const SIGNUP_SUCCESS: &str = "Signup successful! Please log in.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const FORM_INCOMPLETE: &str = "Please enter a username and password.";
pub const STILL_WAITING: &str = "Still waiting for the previous reply...";

pub enum Action {
    // ── Auth gate ───────────────────────────────────────────────────────
    /// First action of the process, with whatever token was on disk.
    Startup { token: Option<String> },
    AuthChecked(Result<(), ApiError>),
    Logout,
    /// The best-effort logout call finished (successfully or not).
    LoggedOut,

    // ── Auth forms ──────────────────────────────────────────────────────
    ShowLogin,
    ShowSignup,
    SubmitLogin(Credentials),
    LoginFinished(Result<TokenResponse, ApiError>),
    SubmitSignup(Credentials),
    SignupFinished(Result<SignupReply, ApiError>),

    // ── Chat session ────────────────────────────────────────────────────
    SendMessage(String),
    ShowTyping(RequestId),
    ReplyReceived {
        request_id: RequestId,
        result: Result<ChatReply, ApiError>,
    },
    NewChat,
    SelectChat(ChatId),
    HistoryLoaded {
        chat_id: ChatId,
        result: Result<Vec<StoredMessage>, ApiError>,
    },
    RefreshChatList,
    ChatListLoaded(Result<Vec<ChatSummary>, ApiError>),
    ToggleSidebar,
    SubmitFeedback {
        satisfactory: bool,
        request_in_person: bool,
    },
    FeedbackFinished(Result<FeedbackReply, ApiError>),

    Quit,
}

/// I/O requested by `update()`, carried out by the controller.
#[derive(PartialEq)]
pub enum Effect {
    None,
    Quit,
    CheckAuth {
        token: String,
    },
    Login(Credentials),
    Signup(Credentials),
    /// Persist the token, then fetch the chat list.
    Authenticated {
        token: String,
    },
    DiscardToken,
    /// Tell the server (best effort), then report `LoggedOut`.
    Logout {
        token: Option<String>,
    },
    /// Post the message and, after `typing_delay`, report `ShowTyping`.
    SendMessage {
        request_id: RequestId,
        token: String,
        request: ChatRequest,
        typing_delay: Duration,
    },
    LoadHistory {
        token: String,
        chat_id: ChatId,
    },
    FetchChatList {
        token: String,
    },
    SubmitFeedback {
        token: String,
        request: FeedbackRequest,
    },
}

const REDACTED: &str = "<redacted>";

fn redact(token: &Option<String>) -> Option<&'static str> {
    token.as_ref().map(|_| REDACTED)
}

// Actions and effects are logged on every step; bearer tokens must not be.
impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Startup { token } => f
                .debug_struct("Startup")
                .field("token", &redact(token))
                .finish(),
            Action::AuthChecked(result) => f.debug_tuple("AuthChecked").field(result).finish(),
            Action::Logout => f.write_str("Logout"),
            Action::LoggedOut => f.write_str("LoggedOut"),
            Action::ShowLogin => f.write_str("ShowLogin"),
            Action::ShowSignup => f.write_str("ShowSignup"),
            Action::SubmitLogin(credentials) => {
                f.debug_tuple("SubmitLogin").field(credentials).finish()
            }
            Action::LoginFinished(result) => f.debug_tuple("LoginFinished").field(result).finish(),
            Action::SubmitSignup(credentials) => {
                f.debug_tuple("SubmitSignup").field(credentials).finish()
            }
            Action::SignupFinished(result) => {
                f.debug_tuple("SignupFinished").field(result).finish()
            }
            Action::SendMessage(text) => f.debug_tuple("SendMessage").field(text).finish(),
            Action::ShowTyping(id) => f.debug_tuple("ShowTyping").field(id).finish(),
            Action::ReplyReceived { request_id, result } => f
                .debug_struct("ReplyReceived")
                .field("request_id", request_id)
                .field("result", result)
                .finish(),
            Action::NewChat => f.write_str("NewChat"),
            Action::SelectChat(chat_id) => f.debug_tuple("SelectChat").field(chat_id).finish(),
            Action::HistoryLoaded { chat_id, result } => f
                .debug_struct("HistoryLoaded")
                .field("chat_id", chat_id)
                .field("result", result)
                .finish(),
            Action::RefreshChatList => f.write_str("RefreshChatList"),
            Action::ChatListLoaded(result) => {
                f.debug_tuple("ChatListLoaded").field(result).finish()
            }
            Action::ToggleSidebar => f.write_str("ToggleSidebar"),
            Action::SubmitFeedback {
                satisfactory,
                request_in_person,
            } => f
                .debug_struct("SubmitFeedback")
                .field("satisfactory", satisfactory)
                .field("request_in_person", request_in_person)
                .finish(),
            Action::FeedbackFinished(result) => {
                f.debug_tuple("FeedbackFinished").field(result).finish()
            }
            Action::Quit => f.write_str("Quit"),
        }
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => f.write_str("None"),
            Effect::Quit => f.write_str("Quit"),
            Effect::CheckAuth { .. } => f
                .debug_struct("CheckAuth")
                .field("token", &REDACTED)
                .finish(),
            Effect::Login(credentials) => f.debug_tuple("Login").field(credentials).finish(),
            Effect::Signup(credentials) => f.debug_tuple("Signup").field(credentials).finish(),
            Effect::Authenticated { .. } => f
                .debug_struct("Authenticated")
                .field("token", &REDACTED)
                .finish(),
            Effect::DiscardToken => f.write_str("DiscardToken"),
            Effect::Logout { token } => f
                .debug_struct("Logout")
                .field("token", &redact(token))
                .finish(),
            Effect::SendMessage {
                request_id,
                request,
                typing_delay,
                ..
            } => f
                .debug_struct("SendMessage")
                .field("request_id", request_id)
                .field("token", &REDACTED)
                .field("request", request)
                .field("typing_delay", typing_delay)
                .finish(),
            Effect::LoadHistory { chat_id, .. } => f
                .debug_struct("LoadHistory")
                .field("token", &REDACTED)
                .field("chat_id", chat_id)
                .finish(),
            Effect::FetchChatList { .. } => f
                .debug_struct("FetchChatList")
                .field("token", &REDACTED)
                .finish(),
            Effect::SubmitFeedback { request, .. } => f
                .debug_struct("SubmitFeedback")
                .field("token", &REDACTED)
                .field("request", request)
                .finish(),
        }
    }
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::Quit => Effect::Quit,

        Action::Startup { token: None } => {
            info!("No stored token, showing login");
            app.screen = Screen::Login;
            Effect::None
        }
        Action::Startup { token: Some(token) } => {
            app.token = Some(token.clone());
            app.screen = Screen::Checking;
            app.status_message = String::from("Checking session...");
            Effect::CheckAuth { token }
        }
        Action::AuthChecked(result) => {
            if app.screen != Screen::Checking {
                return Effect::None;
            }
            match (result, app.token.clone()) {
                (Ok(()), Some(token)) => {
                    enter_chat(app, &token);
                    Effect::FetchChatList { token }
                }
                (Err(e), _) if e.is_unauthorized() => {
                    info!("Stored token rejected: {}", e);
                    sign_out(app, None)
                }
                (Err(e), _) => {
                    // The token was never judged; keep it on disk for the next start.
                    warn!("Could not verify stored token: {}", e);
                    app.clear_session();
                    app.screen = Screen::Login;
                    app.form_notice = None;
                    app.form_error = Some(if e.is_transport() {
                        COMMUNICATION_ERROR.to_string()
                    } else {
                        form_message(&e, LOGIN_FALLBACK)
                    });
                    app.status_message = String::from("Offline");
                    Effect::None
                }
                (Ok(()), None) => sign_out(app, None),
            }
        }
        Action::Logout => {
            app.status_message = String::from("Logging out...");
            Effect::Logout {
                token: app.token.clone(),
            }
        }
        Action::LoggedOut => sign_out(app, None),

        Action::ShowLogin => {
            if matches!(app.screen, Screen::Login | Screen::Signup) {
                app.screen = Screen::Login;
                app.form_error = None;
                app.form_notice = None;
            }
            Effect::None
        }
        Action::ShowSignup => {
            if matches!(app.screen, Screen::Login | Screen::Signup) {
                app.screen = Screen::Signup;
                app.form_error = None;
                app.form_notice = None;
            }
            Effect::None
        }
        Action::SubmitLogin(credentials) => match validate_form(app, credentials) {
            Some(credentials) => Effect::Login(credentials),
            None => Effect::None,
        },
        Action::LoginFinished(result) => {
            app.auth_pending = false;
            match result {
                Ok(response) => {
                    app.clear_session();
                    app.token = Some(response.token.clone());
                    enter_chat(app, &response.token);
                    Effect::Authenticated {
                        token: response.token,
                    }
                }
                Err(e) => {
                    warn!("Login failed: {}", e);
                    app.form_error = Some(form_message(&e, LOGIN_FALLBACK));
                    Effect::None
                }
            }
        }
        Action::SubmitSignup(credentials) => match validate_form(app, credentials) {
            Some(credentials) => Effect::Signup(credentials),
            None => Effect::None,
        },
        Action::SignupFinished(result) => {
            app.auth_pending = false;
            match result {
                Ok(_) => {
                    app.screen = Screen::Login;
                    app.form_error = None;
                    app.form_notice = Some(SIGNUP_SUCCESS.to_string());
                }
                Err(e) => {
                    warn!("Signup failed: {}", e);
                    app.form_error = Some(form_message(&e, SIGNUP_FALLBACK));
                }
            }
            Effect::None
        }

        Action::SendMessage(text) => send_message(app, &text),
        Action::ShowTyping(request_id) => {
            if app.in_flight == Some(request_id) {
                app.typing_visible = true;
            }
            Effect::None
        }
        Action::ReplyReceived { request_id, result } => {
            if app.in_flight != Some(request_id) {
                debug!("Dropping stale reply for request {}", request_id);
                return Effect::None;
            }
            receive_reply(app, result)
        }
        Action::NewChat => {
            app.clear_conversation();
            app.active_chat_id = None;
            app.status_message = String::from("New chat");
            Effect::None
        }
        Action::SelectChat(chat_id) => select_chat(app, chat_id),
        Action::HistoryLoaded { chat_id, result } => {
            if !app.is_active(&chat_id) {
                debug!("Dropping history for inactive chat {}", chat_id);
                return Effect::None;
            }
            match result {
                Ok(messages) => {
                    info!("Loaded {} messages for chat {}", messages.len(), chat_id);
                    app.transcript.replace_with_history(&messages);
                    Effect::None
                }
                Err(e) if e.is_unauthorized() => sign_out(app, Some(SESSION_EXPIRED)),
                Err(e) => {
                    warn!("Failed to load chat {}: {}", chat_id, e);
                    app.status_message = format!("Could not load chat: {e}");
                    Effect::None
                }
            }
        }
        Action::RefreshChatList => match app.token.clone() {
            Some(token) if app.screen == Screen::Chat => Effect::FetchChatList { token },
            _ => Effect::None,
        },
        Action::ChatListLoaded(result) => {
            if app.screen != Screen::Chat {
                return Effect::None;
            }
            match result {
                Ok(chats) => {
                    app.chats = chats;
                    match (&app.active_chat_id, app.chats.first()) {
                        (None, Some(first)) => {
                            let first = first.id.clone();
                            select_chat(app, first)
                        }
                        _ => Effect::None,
                    }
                }
                Err(e) if e.is_unauthorized() => sign_out(app, Some(SESSION_EXPIRED)),
                Err(e) => {
                    warn!("Failed to load chat list: {}", e);
                    app.status_message = format!("Could not load chats: {e}");
                    Effect::None
                }
            }
        }
        Action::ToggleSidebar => {
            app.sidebar_open = !app.sidebar_open;
            Effect::None
        }
        Action::SubmitFeedback {
            satisfactory,
            request_in_person,
        } => {
            let (Some(chat_id), Some(token)) = (app.active_chat_id.clone(), app.token.clone())
            else {
                app.status_message = String::from("Send a message before leaving feedback.");
                return Effect::None;
            };
            app.status_message = String::from("Sending feedback...");
            Effect::SubmitFeedback {
                token,
                request: FeedbackRequest {
                    conversation_id: chat_id,
                    satisfactory,
                    request_in_person,
                },
            }
        }
        Action::FeedbackFinished(result) => match result {
            Ok(reply) => {
                app.status_message = match reply.ticket_reference {
                    Some(reference) => format!("{} (ticket {})", reply.message, reference),
                    None => reply.message,
                };
                Effect::None
            }
            Err(e) if e.is_unauthorized() => sign_out(app, Some(SESSION_EXPIRED)),
            Err(e) => {
                warn!("Feedback failed: {}", e);
                app.status_message = format!("Feedback failed: {e}");
                Effect::None
            }
        },
    }
}

/// Switch to the chat screen for the holder of `token`.
fn enter_chat(app: &mut App, token: &str) {
    app.screen = Screen::Chat;
    app.username = token::display_name(token);
    app.form_error = None;
    app.form_notice = None;
    app.status_message = format!("Signed in as {}", app.username);
}

/// Drop the session and show the login screen.
fn sign_out(app: &mut App, reason: Option<&str>) -> Effect {
    app.clear_session();
    app.screen = Screen::Login;
    app.form_error = reason.map(str::to_string);
    app.form_notice = None;
    app.status_message = String::from("Signed out");
    Effect::DiscardToken
}

/// Require both fields; on success mark the form as submitting.
fn validate_form(app: &mut App, credentials: Credentials) -> Option<Credentials> {
    if app.auth_pending {
        return None;
    }
    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        app.form_error = Some(FORM_INCOMPLETE.to_string());
        return None;
    }
    app.auth_pending = true;
    app.form_error = None;
    app.form_notice = None;
    Some(Credentials::new(username, credentials.password))
}

fn form_message(e: &ApiError, fallback: &str) -> String {
    e.server_message().unwrap_or(fallback).to_string()
}

fn send_message(app: &mut App, text: &str) -> Effect {
    let query = text.trim();
    if query.is_empty() || app.screen != Screen::Chat {
        return Effect::None;
    }
    if app.is_waiting() {
        app.status_message = STILL_WAITING.to_string();
        return Effect::None;
    }
    let Some(token) = app.token.clone() else {
        return sign_out(app, Some(SESSION_EXPIRED));
    };

    app.recent_turns.push_user(query);
    app.transcript.push_user(query);

    let request_id = Uuid::new_v4();
    app.in_flight = Some(request_id);
    app.typing_visible = false;

    Effect::SendMessage {
        request_id,
        token,
        request: ChatRequest {
            query: query.to_string(),
            chat_history: app.recent_turns.history(),
            chat_id: app.active_chat_id.clone(),
        },
        typing_delay: app.typing_delay,
    }
}

fn receive_reply(app: &mut App, result: Result<ChatReply, ApiError>) -> Effect {
    app.in_flight = None;
    app.typing_visible = false;

    match result {
        Ok(reply) => {
            app.recent_turns.fill_bot(&reply.response);
            app.transcript.push_bot(reply.response);
            if let Some(reference) = reply.ticket_reference {
                app.status_message = format!("Ticket reference: {reference}");
            }
            match (&app.active_chat_id, reply.chat_id, app.token.clone()) {
                (None, Some(chat_id), Some(token)) => {
                    info!("Adopting server chat id {}", chat_id);
                    app.active_chat_id = Some(chat_id);
                    Effect::FetchChatList { token }
                }
                _ => Effect::None,
            }
        }
        Err(e) => {
            warn!("Send failed: {}", e);
            let message = if e.is_transport() {
                COMMUNICATION_ERROR
            } else {
                e.server_message().unwrap_or(SEND_FALLBACK)
            };
            app.transcript.push_bot(message);
            if e.is_unauthorized() {
                return sign_out(app, Some(SESSION_EXPIRED));
            }
            Effect::None
        }
    }
}

fn select_chat(app: &mut App, chat_id: ChatId) -> Effect {
    let Some(token) = app.token.clone() else {
        return sign_out(app, Some(SESSION_EXPIRED));
    };
    app.clear_conversation();
    app.active_chat_id = Some(chat_id.clone());
    Effect::LoadHistory { token, chat_id }
}
