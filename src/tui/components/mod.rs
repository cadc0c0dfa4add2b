//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Top status bar showing model name and status
//! - `Message`: One chat bubble
//! - `SettingsPanel`: Sidebar with request settings and key hints
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: Prompt field, masked while entering the API key
//! - `MessageList`: Scrollable conversation view with layout caching
//!
//! Components receive external data as props rather than reading `App`
//! directly, so each can be rendered in isolation against a `TestBackend`.
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs       (Top status bar)
//! ├── message.rs         (Single message renderer)
//! ├── message_list.rs    (Scrollable message container)
//! ├── settings_panel.rs  (Sidebar)
//! └── input_box/         (Prompt / key entry)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{INPUT_HEIGHT, InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod settings_panel;
pub use settings_panel::{PANEL_WIDTH, SettingsPanel};
