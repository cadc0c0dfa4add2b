use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message. Serializes to the chat-completions role names.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persona and formatting rules. Only ever sent, never stored in a Conversation.
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered chat history for one session.
///
/// Messages are append-only: the vector is private and handed out as a slice,
/// so the only ways to change it are [`push`](Self::push) and [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Bumped on every reset so renderers can drop cached layout.
    epoch: u64,
}

impl Conversation {
    /// Creates a conversation seeded with an assistant greeting.
    pub fn new(greeting: &str) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
            epoch: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Appends a message and returns a reference to it.
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Clears the history in place, leaving only the given greeting.
    pub fn reset(&mut self, greeting: &str) {
        self.messages.clear();
        self.messages.push(Message::assistant(greeting));
        self.epoch += 1;
    }
}

/// API credential. `Debug` never prints the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_empty()
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short masked form for display, e.g. `sk-o…a1b2`.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.is_empty() {
            return String::new();
        }
        if chars.len() <= 8 {
            return "•".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            write!(f, "Credential(<missing>)")
        } else {
            write!(f, "Credential(<redacted>)")
        }
    }
}
