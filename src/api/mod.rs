pub mod backend;
pub mod http;
pub mod types;

pub use backend::{ApiError, ChatBackend};
pub use http::HttpBackend;
pub use types::{
    ChatId, ChatReply, ChatRequest, ChatSummary, Credentials, FeedbackReply, FeedbackRequest,
    SignupReply, StoredMessage, TokenResponse,
};
