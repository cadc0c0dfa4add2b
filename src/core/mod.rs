//! # Core Application Logic
//!
//! The bot's session logic. It knows nothing about any specific UI
//! technology and does no network I/O.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session (history)    │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │    TUI     │          │  Headless  │
//!             │  Adapter   │          │ (--prompt) │
//!             │ (ratatui)  │          │            │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`]: `Session`: conversation plus the settings each request reads
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and `update()` reducer
//! - [`config`]: Layered configuration and the `RequestConfig` bounds
//! - [`topic`]: Keyword gate for off-topic prompts

pub mod action;
pub mod config;
pub mod session;
pub mod state;
pub mod topic;
