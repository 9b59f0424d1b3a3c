//! # TUI Components
//!
//! All widgets of the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: app name, signed-in user, status message
//! - `AuthForm`: the login / signup card (its field contents live in
//!   `AuthFormState`)
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state between frames and emit events:
//! - `Composer`: multi-line message input
//! - `TranscriptView`: scrollable conversation with a render cache
//! - `ChatList`: sidebar of saved chats
//!
//! ## Props-Based Data Flow
//!
//! Components receive core data as "props" (struct fields borrowed for one
//! frame), never by reaching into `App`. This keeps their dependencies
//! explicit and lets each be rendered against a `TestBackend` in isolation.
//!
//! ```text
//! components/
//! ├── mod.rs              (this file)
//! ├── title_bar.rs        (top status line)
//! ├── auth_form.rs        (login / signup)
//! ├── transcript_view.rs  (conversation)
//! ├── chat_list.rs        (sidebar)
//! └── composer.rs         (message input)
//! ```

pub mod auth_form;
pub mod chat_list;
pub mod composer;
pub mod title_bar;
pub mod transcript_view;

pub use auth_form::{AuthForm, AuthFormEvent, AuthFormState, AuthMode};
pub use chat_list::{ChatList, ChatListEvent, ChatListState};
pub use composer::{Composer, ComposerEvent};
pub use title_bar::TitleBar;
pub use transcript_view::{TranscriptState, TranscriptView};
