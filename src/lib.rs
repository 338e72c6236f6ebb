// Library exports for testing and potential library use
//
// # Mutex Usage Policy
//
// par-chat uses two mutex types. New code should follow these rules:
//
//   - `parking_lot::Mutex`    - default for all shared state (phrase list
//                               writer, settings store writes, editor model
//                               state). Never hold one while calling out to
//                               listener callbacks registered by other code,
//                               except the phrase list writer, whose
//                               listeners must not mutate the list.
//
//   - `std::sync::Once`       - one-shot initialization only (highlight
//                               controller loading its phrases).

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod channel;
pub mod cli;
pub mod context;
pub mod debug;
pub mod logs;
pub mod message;
pub mod notebook;
pub mod tagged_users;
pub mod user_info;

pub use par_chat_config as config;
pub use par_chat_highlights as highlights;

pub use context::ChatContext;
pub use message::Message;
