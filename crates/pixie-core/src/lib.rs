//! Domain layer of the PixieAI chat core.
//!
//! Holds the types shared by every other crate: conversation memory, the
//! per-turn request and event contract, prompt composition, configuration,
//! and the capability traits implemented by the inference and search
//! adapters.

pub mod config;
pub mod conversation;
pub mod error;
pub mod inference;
pub mod persona;
pub mod prompt;
pub mod search;
pub mod turn;

// Re-export common error type
pub use error::{ErrorKind, PixieError};
