//! # Chat Session
//!
//! One user's conversation plus the sidebar settings that shape each request.
//! Lives for the process only; nothing here touches disk.
//!
//! The conversation only grows through [`Session::append_user`] and
//! [`Session::record_reply`], and only shrinks through [`Session::reset`].

use log::{debug, info};

use crate::core::config::RequestConfig;
use crate::inference::{Conversation, Message};

pub const GREETING: &str = "👋 Hey sneakerhead! 🔥\n\nAsk me about:\n- 🚀 Upcoming releases\n- 🎟️ Raffle information\n- 🔄 Restock alerts\n- 📅 Release dates\n\nI'm your ultimate sneaker guide! 👟";

pub const CLEARED_GREETING: &str = "🧹 Chat cleared! Ask me about the latest sneaker drops! 👟🔥";

#[derive(Debug, Clone)]
pub struct Session {
    conversation: Conversation,
    pub config: RequestConfig,
}

impl Session {
    /// Starts a session seeded with the welcome greeting.
    pub fn new(config: RequestConfig) -> Self {
        Self {
            conversation: Conversation::new(GREETING),
            config,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn append_user(&mut self, prompt: &str) {
        debug!("Appending user message ({} chars)", prompt.len());
        self.conversation.push(Message::user(prompt));
    }

    /// Records the assistant's final text for the current turn.
    pub fn record_reply(&mut self, content: &str) {
        debug!("Recording assistant reply ({} chars)", content.len());
        self.conversation.push(Message::assistant(content));
    }

    /// Clears the history, keeping settings and credential.
    pub fn reset(&mut self) {
        info!(
            "Resetting chat ({} messages dropped)",
            self.conversation.len()
        );
        self.conversation.reset(CLEARED_GREETING);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RequestConfig::default())
    }
}
