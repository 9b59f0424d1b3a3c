//! # Rolling Window
//!
//! The last few (user, bot) exchanges, sent as `chat_history` with every
//! completion request. Anything older is dropped; the server keeps the full
//! conversation.
//!
//! ```text
//! push_user("a")   [(a, _)]
//! fill_bot("A")    [(a, A)]
//! push_user("b")   [(a, A), (b, _)]
//! push_user("b2")  [(a, A), (b2, _)]     <- pending pair is overwritten
//! ```
//!
//! Invariants, upheld by every method:
//! - at most [`ROLLING_WINDOW`] pairs
//! - only the last pair can be pending (empty bot side)

use std::collections::VecDeque;

/// Number of recent turns kept as context.
pub const ROLLING_WINDOW: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub bot: String,
}

impl Turn {
    /// Still waiting for the bot side.
    pub fn is_pending(&self) -> bool {
        self.bot.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentTurns {
    turns: VecDeque<Turn>,
}

impl RecentTurns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user message: overwrite the pending pair, or start a new one.
    pub fn push_user(&mut self, text: &str) {
        match self.turns.back_mut() {
            Some(last) if last.is_pending() => last.user = text.to_string(),
            _ => self.turns.push_back(Turn {
                user: text.to_string(),
                bot: String::new(),
            }),
        }
        self.truncate();
    }

    /// Fill the bot side of the last pair. Returns false if there is no pair.
    pub fn fill_bot(&mut self, text: &str) -> bool {
        let filled = match self.turns.back_mut() {
            Some(last) => {
                last.bot = text.to_string();
                true
            }
            None => false,
        };
        self.truncate();
        filled
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_pending()).count()
    }

    /// Wire form: `[(user, bot), ...]`, oldest first.
    pub fn history(&self) -> Vec<(String, String)> {
        self.turns
            .iter()
            .map(|t| (t.user.clone(), t.bot.clone()))
            .collect()
    }

    fn truncate(&mut self) {
        while self.turns.len() > ROLLING_WINDOW {
            self.turns.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_user_starts_pending_pair() {
        let mut turns = RecentTurns::new();
        turns.push_user("hello");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns.pending_count(), 1);
        assert_eq!(turns.history(), vec![("hello".to_string(), String::new())]);
    }

    #[test]
    fn test_push_user_overwrites_pending_pair() {
        let mut turns = RecentTurns::new();
        turns.push_user("first try");
        turns.push_user("second try");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns.iter().next().unwrap().user, "second try");
    }

    #[test]
    fn test_fill_bot_completes_last_pair() {
        let mut turns = RecentTurns::new();
        turns.push_user("q");
        assert!(turns.fill_bot("a"));
        assert_eq!(turns.pending_count(), 0);
        turns.push_user("q2");
        assert_eq!(turns.len(), 2);
    }

    #[test]
    fn test_fill_bot_without_pair_is_rejected() {
        let mut turns = RecentTurns::new();
        assert!(!turns.fill_bot("orphan"));
        assert!(turns.is_empty());
    }

    #[test]
    fn test_window_keeps_last_three() {
        let mut turns = RecentTurns::new();
        for i in 0..5 {
            turns.push_user(&format!("q{i}"));
            turns.fill_bot(&format!("a{i}"));
        }
        let users: Vec<String> = turns.iter().map(|t| t.user.clone()).collect();
        assert_eq!(users, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_invariants_hold_for_mixed_sequences() {
        // Deterministic pseudo-random walk over push/fill/failed-send patterns.
        let mut turns = RecentTurns::new();
        let mut seed: u32 = 17;
        for step in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (seed >> 16) % 3 {
                0 => turns.push_user(&format!("u{step}")),
                1 => {
                    turns.fill_bot(&format!("b{step}"));
                }
                _ => turns.push_user(""),
            }
            assert!(turns.len() <= ROLLING_WINDOW);
            assert!(turns.pending_count() <= 1);
            let pending_not_last = turns
                .iter()
                .take(turns.len().saturating_sub(1))
                .any(Turn::is_pending);
            assert!(!pending_not_last, "only the tail may be pending");
        }
    }
}
