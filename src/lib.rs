//! Sneaker Bot library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod inference;
pub mod pipeline;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Models offered in the model selector. Deliberately a closed set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Model {
    #[default]
    #[value(name = "google/palm-2-chat-bison")]
    #[serde(rename = "google/palm-2-chat-bison")]
    PalmTwoChatBison,
}

impl Model {
    /// Identifier sent to the completion API.
    pub fn id(self) -> &'static str {
        match self {
            Model::PalmTwoChatBison => "google/palm-2-chat-bison",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_matches_serde_name() {
        let json = serde_json::to_string(&Model::PalmTwoChatBison).unwrap();
        assert_eq!(json, format!("\"{}\"", Model::PalmTwoChatBison.id()));
    }
}
