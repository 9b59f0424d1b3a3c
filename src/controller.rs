//! # Controller
//!
//! Glue between the pure reducer and the outside world. The controller owns
//! the `App`, feeds actions through `update()`, and turns each returned
//! `Effect` into I/O: a background job against the [`ChatBackend`], or a
//! synchronous write to the token file.
//!
//! ```text
//!  dispatch(Action) ──► update() ──► Effect ──► spawn job ──┐
//!        ▲                                                  │
//!        └──────────── drain() / next() ◄── channel ◄───────┘
//! ```
//!
//! Every spawned job sends exactly one action back, so counting outstanding
//! jobs is enough to know when the system has gone quiet. The TUI polls with
//! [`Controller::drain`]; tests await [`Controller::settle`].

use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::ChatBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::credentials::CredentialStore;
use crate::core::state::App;

pub struct Controller {
    app: App,
    backend: Arc<dyn ChatBackend>,
    credentials: CredentialStore,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
    pending_jobs: usize,
    quit: bool,
}

impl Controller {
    pub fn new(app: App, backend: Arc<dyn ChatBackend>, credentials: CredentialStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            app,
            backend,
            credentials,
            tx,
            rx,
            pending_jobs: 0,
            quit: false,
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Jobs spawned but not yet reported back.
    pub fn pending_jobs(&self) -> usize {
        self.pending_jobs
    }

    /// Read the stored token and run the auth gate.
    pub fn start(&mut self) {
        let token = self.credentials.load();
        info!(
            "Starting against {} (stored token: {})",
            self.backend.base_url(),
            token.is_some()
        );
        self.dispatch(Action::Startup { token });
    }

    pub fn dispatch(&mut self, action: Action) {
        let effect = update(&mut self.app, action);
        self.run(effect);
    }

    /// Apply every action already reported by finished jobs. Never blocks.
    ///
    /// Returns true if anything was applied.
    pub fn drain(&mut self) -> bool {
        let mut applied = false;
        while let Ok(action) = self.rx.try_recv() {
            self.receive(action);
            applied = true;
        }
        applied
    }

    /// Wait for the next job to report and apply its action.
    ///
    /// Returns false immediately when nothing is outstanding.
    pub async fn next(&mut self) -> bool {
        if self.pending_jobs == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(action) => {
                self.receive(action);
                true
            }
            None => false,
        }
    }

    /// Apply job results until no job is outstanding.
    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    fn receive(&mut self, action: Action) {
        self.pending_jobs = self.pending_jobs.saturating_sub(1);
        debug!("Job reported: {:?}", action);
        self.dispatch(action);
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Quit => self.quit = true,
            Effect::CheckAuth { token } => {
                let backend = self.backend.clone();
                self.spawn(async move { Action::AuthChecked(backend.check_auth(&token).await) });
            }
            Effect::Login(credentials) => {
                let backend = self.backend.clone();
                self.spawn(async move { Action::LoginFinished(backend.login(&credentials).await) });
            }
            Effect::Signup(credentials) => {
                let backend = self.backend.clone();
                self.spawn(
                    async move { Action::SignupFinished(backend.signup(&credentials).await) },
                );
            }
            Effect::Authenticated { token } => {
                if let Err(e) = self.credentials.save(&token) {
                    warn!(
                        "Failed to store token at {}: {}",
                        self.credentials.path().display(),
                        e
                    );
                }
                self.fetch_chat_list(token);
            }
            Effect::DiscardToken => {
                if let Err(e) = self.credentials.clear() {
                    warn!(
                        "Failed to remove token at {}: {}",
                        self.credentials.path().display(),
                        e
                    );
                }
            }
            Effect::Logout { token } => {
                let backend = self.backend.clone();
                self.spawn(async move {
                    if let Some(token) = token
                        && let Err(e) = backend.logout(&token).await
                    {
                        warn!("Server-side logout failed, signing out locally: {}", e);
                    }
                    Action::LoggedOut
                });
            }
            Effect::SendMessage {
                request_id,
                token,
                request,
                typing_delay,
            } => {
                let backend = self.backend.clone();
                self.spawn(async move {
                    let result = backend.send_message(&token, &request).await;
                    Action::ReplyReceived { request_id, result }
                });
                self.spawn(async move {
                    tokio::time::sleep(typing_delay).await;
                    Action::ShowTyping(request_id)
                });
            }
            Effect::LoadHistory { token, chat_id } => {
                let backend = self.backend.clone();
                self.spawn(async move {
                    let result = backend.chat_messages(&token, &chat_id).await;
                    Action::HistoryLoaded { chat_id, result }
                });
            }
            Effect::FetchChatList { token } => self.fetch_chat_list(token),
            Effect::SubmitFeedback { token, request } => {
                let backend = self.backend.clone();
                self.spawn(async move {
                    Action::FeedbackFinished(backend.submit_feedback(&token, &request).await)
                });
            }
        }
    }

    fn fetch_chat_list(&mut self, token: String) {
        let backend = self.backend.clone();
        self.spawn(async move { Action::ChatListLoaded(backend.list_chats(&token).await) });
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        self.pending_jobs += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = job.await;
            if tx.send(action).is_err() {
                warn!("Failed to report job result: receiver dropped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ChatId, ChatReply, StoredMessage};
    use crate::core::action::{COMMUNICATION_ERROR, SESSION_EXPIRED};
    use crate::core::state::Screen;
    use crate::core::transcript::Sender;
    use crate::test_support::{FakeBackend, chat_app, summary, temp_token_path, test_app};

    fn controller(app: App, backend: Arc<FakeBackend>) -> Controller {
        Controller::new(app, backend, CredentialStore::new(temp_token_path()))
    }

    #[tokio::test]
    async fn test_start_without_token_shows_login_and_calls_nothing() {
        let backend = Arc::new(FakeBackend::new());
        let mut ctl = controller(test_app(), backend.clone());
        ctl.start();
        ctl.settle().await;
        assert_eq!(ctl.app().screen, Screen::Login);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_with_valid_token_enters_chat_and_lists() {
        let backend = Arc::new(FakeBackend::new());
        *backend.chats.lock().unwrap() = Ok(vec![summary(4, Some("Parking"))]);
        let store = CredentialStore::new(temp_token_path());
        store
            .save(&crate::core::token::fake_jwt(r#"{"sub":"dana"}"#))
            .unwrap();
        let mut ctl = Controller::new(test_app(), backend.clone(), store);

        ctl.start();
        ctl.settle().await;

        assert_eq!(ctl.app().screen, Screen::Chat);
        assert_eq!(ctl.app().username, "dana");
        assert_eq!(
            backend.calls(),
            vec!["check_auth", "list_chats", "chat_messages"]
        );
        assert_eq!(ctl.app().active_chat_id, Some(ChatId::Number(4)));
        ctl.credentials.clear().unwrap();
    }

    #[tokio::test]
    async fn test_rejected_token_is_removed_from_disk() {
        let backend = Arc::new(FakeBackend::new());
        *backend.check_auth.lock().unwrap() = Err(ApiError::Unauthorized { message: None });
        let store = CredentialStore::new(temp_token_path());
        store.save("stale").unwrap();
        let mut ctl = Controller::new(test_app(), backend, store);

        ctl.start();
        ctl.settle().await;

        assert_eq!(ctl.app().screen, Screen::Login);
        assert_eq!(ctl.credentials.load(), None);
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let backend = Arc::new(FakeBackend::new());
        let mut ctl = controller(test_app(), backend.clone());
        ctl.dispatch(Action::SubmitLogin(crate::api::Credentials::new("tester", "pw")));
        ctl.settle().await;

        assert_eq!(ctl.app().screen, Screen::Chat);
        assert_eq!(ctl.credentials.load(), ctl.app().token);
        assert_eq!(backend.calls(), vec!["login", "list_chats"]);
        ctl.credentials.clear().unwrap();
    }

    #[tokio::test]
    async fn test_send_round_trip_adopts_chat_and_refreshes_once() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_reply(Ok(ChatReply {
            response: "The library opens at 8.".to_string(),
            chat_id: Some(ChatId::Number(21)),
            ticket_reference: None,
        }));
        let mut ctl = controller(chat_app(), backend.clone());

        ctl.dispatch(Action::SendMessage("When does the library open?".to_string()));
        ctl.settle().await;

        let app = ctl.app();
        assert_eq!(app.transcript.len(), 2);
        assert_eq!(app.transcript.last().unwrap().sender, Sender::Bot);
        assert!(!app.typing_visible);
        assert_eq!(app.active_chat_id, Some(ChatId::Number(21)));
        assert_eq!(backend.count("list_chats"), 1);
        // The refreshed list doesn't re-select: a chat is already active.
        assert_eq!(backend.count("chat_messages"), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_renders_one_error_entry() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_reply(Err(ApiError::Network("connection refused".to_string())));
        let mut ctl = controller(chat_app(), backend);

        ctl.dispatch(Action::SendMessage("hello".to_string()));
        ctl.settle().await;

        let entries = ctl.app().transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].text, COMMUNICATION_ERROR);
        assert!(!ctl.app().typing_visible);
    }

    #[tokio::test]
    async fn test_second_send_while_waiting_makes_no_call() {
        let backend = Arc::new(FakeBackend::new());
        let mut ctl = controller(chat_app(), backend.clone());

        ctl.dispatch(Action::SendMessage("one".to_string()));
        ctl.dispatch(Action::SendMessage("two".to_string()));
        ctl.settle().await;

        assert_eq!(backend.count("send_message"), 1);
        assert_eq!(backend.sent.lock().unwrap()[0].query, "one");
    }

    #[tokio::test]
    async fn test_select_chat_replaces_transcript() {
        let backend = Arc::new(FakeBackend::new());
        *backend.history.lock().unwrap() = Ok(vec![
            StoredMessage {
                content: "Where is B12?".to_string(),
                sender: "user".to_string(),
            },
            StoredMessage {
                content: "Second floor.".to_string(),
                sender: "bot".to_string(),
            },
        ]);
        let mut app = chat_app();
        app.transcript.push_user("old");
        let mut ctl = controller(app, backend);

        ctl.dispatch(Action::SelectChat(ChatId::Number(2)));
        ctl.settle().await;

        let texts: Vec<&str> = ctl
            .app()
            .transcript
            .entries()
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Where is B12?", "Second floor."]);
    }

    #[tokio::test]
    async fn test_logout_clears_token_even_when_server_fails() {
        let backend = Arc::new(FakeBackend::new());
        *backend.logout.lock().unwrap() = Err(ApiError::Network("down".to_string()));
        let app = chat_app();
        let store = CredentialStore::new(temp_token_path());
        store.save(app.token.as_deref().unwrap()).unwrap();
        let mut ctl = Controller::new(app, backend.clone(), store);

        ctl.dispatch(Action::Logout);
        ctl.settle().await;

        assert_eq!(backend.count("logout"), 1);
        assert_eq!(ctl.app().screen, Screen::Login);
        assert!(ctl.app().token.is_none());
        assert_eq!(ctl.credentials.load(), None);
    }

    #[tokio::test]
    async fn test_expired_session_mid_chat_signs_out() {
        let backend = Arc::new(FakeBackend::new());
        *backend.chats.lock().unwrap() = Err(ApiError::Unauthorized { message: None });
        let mut ctl = controller(chat_app(), backend);

        ctl.dispatch(Action::RefreshChatList);
        ctl.settle().await;

        assert_eq!(ctl.app().screen, Screen::Login);
        assert_eq!(ctl.app().form_error.as_deref(), Some(SESSION_EXPIRED));
    }

    #[tokio::test]
    async fn test_quit_sets_flag_without_jobs() {
        let mut ctl = controller(chat_app(), Arc::new(FakeBackend::new()));
        ctl.dispatch(Action::Quit);
        assert!(ctl.should_quit());
        assert_eq!(ctl.pending_jobs(), 0);
    }
}
