//! Conversation memory.
//!
//! # Module Structure
//!
//! - `message`: A single exchanged message (`Role`, `ConversationTurn`)
//! - `history`: The append-only log owned by a chat session (`ConversationHistory`)
//!
//! # Usage
//!
//! ```
//! use pixie_core::conversation::{ConversationHistory, ConversationTurn};
//!
//! let mut history = ConversationHistory::new();
//! history.push(ConversationTurn::user("What is 2+2?"));
//! history.push(ConversationTurn::assistant("4"));
//! assert_eq!(history.window().len(), 2);
//! ```

mod history;
mod message;

pub use history::{ConversationHistory, HISTORY_WINDOW_TURNS};
pub use message::{ConversationTurn, Role};
