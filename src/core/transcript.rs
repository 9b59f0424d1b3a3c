//! The conversation as shown on screen: one entry per message, in insertion
//! order. The typing indicator is not an entry; the view draws it after the
//! last one.

use crate::api::StoredMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// Rendered as literal text.
    User,
    /// Rendered as Markdown.
    Bot,
}

impl Sender {
    /// Map a stored sender role. Anything that isn't the user is shown as the bot.
    pub fn from_role(role: &str) -> Self {
        if role.eq_ignore_ascii_case("user") {
            Sender::User
        } else {
            Sender::Bot
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Bot => "campusguide",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.entries.push(Entry {
            sender,
            text: text.into(),
        });
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Sender::User, text);
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.push(Sender::Bot, text);
    }

    /// Replace everything with a server-side history.
    pub fn replace_with_history(&mut self, messages: &[StoredMessage]) {
        self.entries = messages
            .iter()
            .map(|m| Entry {
                sender: Sender::from_role(&m.sender),
                text: m.content.clone(),
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(sender: &str, content: &str) -> StoredMessage {
        StoredMessage {
            sender: sender.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_from_role() {
        assert_eq!(Sender::from_role("user"), Sender::User);
        assert_eq!(Sender::from_role("bot"), Sender::Bot);
        assert_eq!(Sender::from_role("ar_staff"), Sender::Bot);
    }

    #[test]
    fn test_replace_with_history_keeps_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("stale");
        transcript.replace_with_history(&[
            stored("user", "When is enrollment?"),
            stored("bot", "Enrollment opens **May 1**."),
        ]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.entries()[0].sender, Sender::User);
        assert_eq!(transcript.entries()[0].text, "When is enrollment?");
        assert_eq!(transcript.entries()[1].sender, Sender::Bot);
    }
}
