//! reqwest implementation of [`ChatBackend`].
//!
//! Every call follows the same shape: build the request, attach the bearer
//! token where required, send, then hand the response to [`read_json`] or
//! [`expect_success`]. Status handling lives in one place so that each
//! endpoint method stays a few lines long.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ChatBackend};
use super::types::{
    ChatId, ChatReply, ChatRequest, ChatSummary, Credentials, ErrorBody, FeedbackReply,
    FeedbackRequest, SignupReply, StoredMessage, TokenResponse,
};

/// HTTP client for a CampusGuide server.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// `timeout` bounds each whole request; `None` leaves it to the OS.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        info!("HTTP backend configured for {}", base_url);
        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }
}

/// Turn a non-success response into the matching `ApiError`.
///
/// The body is still read and parsed for a `message`/`detail` field.
async fn error_from(response: Response) -> ApiError {
    let status = response.status();
    let message = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(ErrorBody::into_message),
        Err(e) => {
            warn!("Failed to read error body (HTTP {}): {}", status, e);
            None
        }
    };
    warn!("Request failed: HTTP {} {:?}", status, message);

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized { message }
    } else {
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Check the status, then deserialize the body as `T`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from(response).await);
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!("Unparseable body: {}", String::from_utf8_lossy(&bytes));
        ApiError::MalformedResponse(e.to_string())
    })
}

/// Check the status and discard the body.
async fn expect_success(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from(response).await)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        debug!("POST /api/login for {}", credentials.username);
        let response = self
            .send(self.client.post(self.url("/api/login")).json(credentials))
            .await?;
        read_json(response).await
    }

    async fn signup(&self, credentials: &Credentials) -> Result<SignupReply, ApiError> {
        debug!("POST /api/signup for {}", credentials.username);
        let response = self
            .send(self.client.post(self.url("/api/signup")).json(credentials))
            .await?;
        read_json(response).await
    }

    async fn check_auth(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .send(self.client.get(self.url("/api/check_auth")).bearer_auth(token))
            .await?;
        expect_success(response).await
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .send(self.client.post(self.url("/api/logout")).bearer_auth(token))
            .await?;
        expect_success(response).await
    }

    async fn list_chats(&self, token: &str) -> Result<Vec<ChatSummary>, ApiError> {
        let response = self
            .send(self.client.get(self.url("/api/chats")).bearer_auth(token))
            .await?;
        read_json(response).await
    }

    async fn chat_messages(
        &self,
        token: &str,
        chat_id: &ChatId,
    ) -> Result<Vec<StoredMessage>, ApiError> {
        let path = format!("/api/chats/{chat_id}/messages");
        let response = self
            .send(self.client.get(self.url(&path)).bearer_auth(token))
            .await?;
        read_json(response).await
    }

    async fn send_message(
        &self,
        token: &str,
        request: &ChatRequest,
    ) -> Result<ChatReply, ApiError> {
        info!(
            "POST /chat/: query_len={}, history={}, chat_id={:?}",
            request.query.len(),
            request.chat_history.len(),
            request.chat_id
        );
        let response = self
            .send(
                self.client
                    .post(self.url("/chat/"))
                    .bearer_auth(token)
                    .json(request),
            )
            .await?;
        read_json(response).await
    }

    async fn submit_feedback(
        &self,
        token: &str,
        request: &FeedbackRequest,
    ) -> Result<FeedbackReply, ApiError> {
        let response = self
            .send(
                self.client
                    .post(self.url("/feedback"))
                    .bearer_auth(token)
                    .json(request),
            )
            .await?;
        read_json(response).await
    }
}
