//! Wire types for the CampusGuide HTTP API.
//!
//! One record per request/response body. Everything the server may omit is
//! `Option` with `#[serde(default)]` so that a sparse body still parses;
//! anything that doesn't parse becomes `ApiError::MalformedResponse` at the
//! client boundary.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Server-assigned conversation identifier.
///
/// The backend issues integers, but the client treats the id as opaque and
/// echoes back whichever JSON form it received.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ChatId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Number(n) => write!(f, "{n}"),
            ChatId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ChatId {
    fn from(n: i64) -> Self {
        ChatId::Number(n)
    }
}

/// Username/password pair posted to `/api/login` and `/api/signup`.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Never print the password, not even at debug level.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Clone, PartialEq)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Signup answers with either a token (which we ignore, the user logs in
/// explicitly afterwards) or a plain message.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SignupReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /chat/`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub query: String,
    /// Rolling window of `(user, bot)` pairs, oldest first.
    pub chat_history: Vec<(String, String)>,
    pub chat_id: Option<ChatId>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    #[serde(default)]
    pub ticket_reference: Option<String>,
}

/// One entry of `GET /api/chats`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatSummary {
    pub id: ChatId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ChatSummary {
    /// Title for the sidebar; untitled chats fall back to their id.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Chat {}", self.id),
        }
    }

    /// "Jan 15" style label, or None if the timestamp is missing or unreadable.
    ///
    /// The server sends naive ISO-8601 for older rows and RFC 3339 for newer ones.
    pub fn created_label(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.format("%b %d").to_string());
        }
        raw.parse::<NaiveDateTime>()
            .ok()
            .map(|dt| dt.format("%b %d").to_string())
    }
}

/// One entry of `GET /api/chats/{id}/messages`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub content: String,
    pub sender: String,
}

/// Body of `POST /feedback`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackRequest {
    pub conversation_id: ChatId,
    pub satisfactory: bool,
    pub request_in_person: bool,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FeedbackReply {
    pub message: String,
    #[serde(default)]
    pub ticket_reference: Option<String>,
}

/// Error payload. Handlers in the backend use `message`, the framework
/// itself uses `detail` (a string, or a list of validation errors).
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        if let Some(message) = self.message.filter(|m| !m.trim().is_empty()) {
            return Some(message);
        }
        match self.detail? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Array(items) => items
                .first()
                .and_then(|first| first.get("msg"))
                .and_then(|msg| msg.as_str())
                .map(str::to_string),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest {
            query: "Where is the library?".to_string(),
            chat_history: vec![("hi".to_string(), "hello".to_string())],
            chat_id: Some(ChatId::Number(7)),
        };
        let serialized = serde_json::to_string(&req).unwrap();
        assert_eq!(
            serialized,
            r#"{"query":"Where is the library?","chat_history":[["hi","hello"]],"chat_id":7}"#
        );
    }

    #[test]
    fn test_chat_request_without_chat_id_sends_null() {
        let req = ChatRequest {
            query: "q".to_string(),
            chat_history: vec![],
            chat_id: None,
        };
        let serialized = serde_json::to_string(&req).unwrap();
        assert_eq!(serialized, r#"{"query":"q","chat_history":[],"chat_id":null}"#);
    }

    #[test]
    fn test_chat_id_accepts_number_or_string() {
        let n: ChatId = serde_json::from_str("42").unwrap();
        let s: ChatId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(n, ChatId::Number(42));
        assert_eq!(s, ChatId::Text("abc".to_string()));
        assert_eq!(n.to_string(), "42");
    }

    #[test]
    fn test_chat_reply_optional_fields() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(reply.response, "hi");
        assert!(reply.chat_id.is_none());
        assert!(reply.ticket_reference.is_none());
    }

    #[test]
    fn test_summary_display_title_falls_back_to_id() {
        let summary: ChatSummary = serde_json::from_str(r#"{"id":3,"title":null}"#).unwrap();
        assert_eq!(summary.display_title(), "Chat 3");

        let summary: ChatSummary =
            serde_json::from_str(r#"{"id":3,"title":"Exam dates..."}"#).unwrap();
        assert_eq!(summary.display_title(), "Exam dates...");
    }

    #[test]
    fn test_summary_created_label_parses_both_formats() {
        let naive: ChatSummary =
            serde_json::from_str(r#"{"id":1,"created_at":"2024-01-15T09:30:00"}"#).unwrap();
        assert_eq!(naive.created_label().as_deref(), Some("Jan 15"));

        let aware: ChatSummary =
            serde_json::from_str(r#"{"id":1,"created_at":"2024-03-02T09:30:00+00:00"}"#).unwrap();
        assert_eq!(aware.created_label().as_deref(), Some("Mar 02"));

        let junk: ChatSummary =
            serde_json::from_str(r#"{"id":1,"created_at":"yesterday"}"#).unwrap();
        assert_eq!(junk.created_label(), None);
    }

    #[test]
    fn test_error_body_prefers_message_then_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"overloaded"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("overloaded"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail":"Incorrect username or password"}"#).unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Incorrect username or password")
        );

        let body: ErrorBody = serde_json::from_str(
            r#"{"detail":[{"loc":["body","query"],"msg":"field required"}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("field required"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
