//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{
    ApiError, ChatBackend, ChatId, ChatReply, ChatRequest, ChatSummary, Credentials,
    FeedbackReply, FeedbackRequest, SignupReply, StoredMessage, TokenResponse,
};
use crate::core::state::{App, Screen};
use crate::core::token::fake_jwt;

/// Creates a test App on the login screen with no typing delay.
pub fn test_app() -> App {
    App::new(Duration::ZERO, true)
}

/// A test App that is already signed in as `tester`.
pub fn chat_app() -> App {
    let mut app = test_app();
    let token = fake_jwt(r#"{"sub":"tester"}"#);
    app.username = crate::core::token::display_name(&token);
    app.token = Some(token);
    app.screen = Screen::Chat;
    app
}

pub fn summary(id: i64, title: Option<&str>) -> ChatSummary {
    ChatSummary {
        id: ChatId::Number(id),
        title: title.map(str::to_string),
        created_at: None,
    }
}

/// A fresh, not-yet-existing file path under the system temp dir.
pub fn temp_token_path() -> PathBuf {
    std::env::temp_dir().join(format!("campusguide-test-{}.token", uuid::Uuid::new_v4()))
}

/// Scripted in-memory backend. Every call is recorded by endpoint name.
///
/// Unscripted endpoints succeed with empty or trivial bodies.
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub check_auth: Mutex<Result<(), ApiError>>,
    pub login: Mutex<Result<TokenResponse, ApiError>>,
    pub logout: Mutex<Result<(), ApiError>>,
    pub chats: Mutex<Result<Vec<ChatSummary>, ApiError>>,
    pub history: Mutex<Result<Vec<StoredMessage>, ApiError>>,
    /// Replies handed out in order; when empty, `send_message` echoes "ok".
    pub replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    pub sent: Mutex<Vec<ChatRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            check_auth: Mutex::new(Ok(())),
            login: Mutex::new(Ok(TokenResponse {
                token: fake_jwt(r#"{"sub":"tester"}"#),
                token_type: Some("bearer".to_string()),
            })),
            logout: Mutex::new(Ok(())),
            chats: Mutex::new(Ok(Vec::new())),
            history: Mutex::new(Ok(Vec::new())),
            replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: Result<ChatReply, ApiError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| *c == endpoint).count()
    }

    fn record(&self, endpoint: &str) {
        self.calls.lock().unwrap().push(endpoint.to_string());
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    fn base_url(&self) -> &str {
        "fake://"
    }

    async fn login(&self, _credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.record("login");
        self.login.lock().unwrap().clone()
    }

    async fn signup(&self, _credentials: &Credentials) -> Result<SignupReply, ApiError> {
        self.record("signup");
        Ok(SignupReply::default())
    }

    async fn check_auth(&self, _token: &str) -> Result<(), ApiError> {
        self.record("check_auth");
        self.check_auth.lock().unwrap().clone()
    }

    async fn logout(&self, _token: &str) -> Result<(), ApiError> {
        self.record("logout");
        self.logout.lock().unwrap().clone()
    }

    async fn list_chats(&self, _token: &str) -> Result<Vec<ChatSummary>, ApiError> {
        self.record("list_chats");
        self.chats.lock().unwrap().clone()
    }

    async fn chat_messages(
        &self,
        _token: &str,
        _chat_id: &ChatId,
    ) -> Result<Vec<StoredMessage>, ApiError> {
        self.record("chat_messages");
        self.history.lock().unwrap().clone()
    }

    async fn send_message(
        &self,
        _token: &str,
        request: &ChatRequest,
    ) -> Result<ChatReply, ApiError> {
        self.record("send_message");
        self.sent.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(ChatReply {
                response: "ok".to_string(),
                chat_id: None,
                ticket_reference: None,
            })
        })
    }

    async fn submit_feedback(
        &self,
        _token: &str,
        _request: &FeedbackRequest,
    ) -> Result<FeedbackReply, ApiError> {
        self.record("submit_feedback");
        Ok(FeedbackReply {
            message: "Thanks for your feedback!".to_string(),
            ticket_reference: None,
        })
    }
}
