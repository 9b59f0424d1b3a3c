use std::fmt;

use async_trait::async_trait;

use super::types::{
    ChatId, ChatReply, ChatRequest, ChatSummary, Credentials, FeedbackReply, FeedbackRequest,
    SignupReply, StoredMessage, TokenResponse,
};

/// Errors that can occur while talking to the CampusGuide API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (bad base URL, TLS setup).
    Config(String),
    /// The request never completed (DNS, connection refused, timeout).
    Network(String),
    /// HTTP 401. The stored token is no longer accepted.
    Unauthorized { message: Option<String> },
    /// Any other non-success status, with the server's message if it sent one.
    Api { status: u16, message: Option<String> },
    /// A 2xx body that doesn't match the expected shape.
    MalformedResponse(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Api { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// True when the server was never reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Config(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Unauthorized { message } => match message {
                Some(m) => write!(f, "unauthorized: {m}"),
                None => write!(f, "unauthorized"),
            },
            ApiError::Api { status, message } => match message {
                Some(m) => write!(f, "API error (HTTP {status}): {m}"),
                None => write!(f, "API error (HTTP {status})"),
            },
            ApiError::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The remote service, one method per endpoint.
///
/// Authenticated calls take the bearer token explicitly; the backend keeps
/// no session of its own.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Base URL, for logging.
    fn base_url(&self) -> &str;

    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError>;

    async fn signup(&self, credentials: &Credentials) -> Result<SignupReply, ApiError>;

    /// `Ok(())` if the server still accepts `token`.
    async fn check_auth(&self, token: &str) -> Result<(), ApiError>;

    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    async fn list_chats(&self, token: &str) -> Result<Vec<ChatSummary>, ApiError>;

    async fn chat_messages(
        &self,
        token: &str,
        chat_id: &ChatId,
    ) -> Result<Vec<StoredMessage>, ApiError>;

    async fn send_message(&self, token: &str, request: &ChatRequest)
    -> Result<ChatReply, ApiError>;

    async fn submit_feedback(
        &self,
        token: &str,
        request: &FeedbackRequest,
    ) -> Result<FeedbackReply, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_only_for_http_errors() {
        let api = ApiError::Api {
            status: 500,
            message: Some("overloaded".to_string()),
        };
        assert_eq!(api.server_message(), Some("overloaded"));
        assert_eq!(ApiError::Network("refused".to_string()).server_message(), None);
    }

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::Api {
            status: 404,
            message: Some("Chat not found".to_string()),
        };
        assert_eq!(err.to_string(), "API error (HTTP 404): Chat not found");
        assert_eq!(
            ApiError::Unauthorized { message: None }.to_string(),
            "unauthorized"
        );
    }

    #[test]
    fn test_transport_classification() {
        assert!(ApiError::Network("timeout".to_string()).is_transport());
        assert!(!ApiError::MalformedResponse("eof".to_string()).is_transport());
        assert!(ApiError::Unauthorized { message: None }.is_unauthorized());
    }
}
