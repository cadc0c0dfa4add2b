//! # Request Builder
//!
//! Turns the session's conversation and settings into one owned
//! [`CompletionRequest`]. Pure: no I/O, never fails.

use chrono::NaiveDate;

use crate::core::config::RequestConfig;
use crate::inference::{CompletionRequest, Conversation};

/// Persona and output rules sent as the system message of every request.
/// The current date is appended as rule 5.
const SYSTEM_RULES: &str = "You are a professional sneaker release analyst. Follow these rules:
1. Use emojis to make responses engaging
2. Format lists with bullet points (•)
3. Include dates as: Month Day, Year
4. Structure information clearly:
• 🔥 Release Name: [Name]
• 📅 Date: [Date]
• 🏪 Stores: [Where to buy]
• 💰 Resell: [Price]
5. Current date: ";

/// Renders a date the way the persona is asked to, e.g. `June 01, 2024`.
pub fn format_release_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

pub fn system_prompt(today: NaiveDate) -> String {
    format!("{SYSTEM_RULES}{}", format_release_date(today))
}

/// Builds the payload for the turn whose user message was just appended.
pub fn build_request(
    conversation: &Conversation,
    config: &RequestConfig,
    today: NaiveDate,
) -> CompletionRequest {
    CompletionRequest {
        model: config.model.id().to_string(),
        system_prompt: system_prompt(today),
        messages: conversation.messages().to_vec(),
        temperature: config.temperature(),
        credential: config.credential().clone(),
    }
}
