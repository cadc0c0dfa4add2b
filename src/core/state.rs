//! # Application State
//!
//! Core business state for the bot. No TUI-specific types here;
//! presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── session: Session            // conversation + request settings
//! ├── topic_filter: bool          // refuse non-sneaker prompts
//! ├── status_message: String      // status bar text
//! ├── is_loading: bool            // a turn is in flight
//! ├── error: Option<String>       // error banner text
//! └── reveal: Option<String>      // in-progress reply frame
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::config::ResolvedConfig;
use crate::core::session::Session;

pub struct App {
    pub session: Session,
    pub topic_filter: bool,
    pub status_message: String,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Latest reveal frame while a turn is in flight.
    pub reveal: Option<String>,
}

impl App {
    pub fn new(session: Session, topic_filter: bool) -> Self {
        Self {
            session,
            topic_filter,
            status_message: String::from("Welcome to Sneaker Bot!"),
            is_loading: false,
            error: None,
            reveal: None,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(Session::new(config.request_config()), config.topic_filter)
    }
}
