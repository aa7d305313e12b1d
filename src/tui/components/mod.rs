//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields, built each frame:
//! - `TitleBar`: app name, status message, unseen-content marker
//! - `Message`: one chat bubble with its reasoning panel and controls
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep state between frames and emit events:
//! - `InputBox`: text field for the next question
//! - `MessageList`: scrollable conversation view with layout caching
//!
//! ### Props-Based Data Flow
//!
//! Components receive external data as props, never by reaching into
//! `App`. This keeps dependencies explicit and components testable with
//! `TestBackend`:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(app.status_message.clone(), has_unseen);
//! title_bar.render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── message.rs       (Single bubble + pending placeholder)
//! ├── message_list.rs  (Scrollable message container)
//! └── input_box.rs     (Text input)
//! ```

pub mod input_box;
pub mod message;
pub mod message_list;
pub mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use message::{Control, Message};
pub use message_list::{MessageList, MessageListState};
pub use title_bar::TitleBar;
