//! # Core Application Logic
//!
//! CampusGuide's business logic. It knows nothing about the terminal and
//! never performs I/O itself.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                                ▼
//!                    ┌─────────────────────────┐
//!                    │       Controller        │
//!                    │  HTTP jobs, token file  │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                    ┌─────────────────────────┐
//!                    │      TUI Adapter        │
//!                    │       (ratatui)         │
//!                    └─────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`turns`]: Rolling window of recent exchanges sent as context
//! - [`transcript`]: The messages shown on screen
//! - [`token`]: Username extraction from the bearer token
//! - [`credentials`]: Token persistence across restarts
//! - [`config`]: Settings file and override hierarchy

pub mod action;
pub mod config;
pub mod credentials;
pub mod state;
pub mod token;
pub mod transcript;
pub mod turns;
