//! Web search domain types.
//!
//! - `model`: Search hits and the outcome of a lookup
//! - `provider`: The capability trait implemented by search adapters
//! - `format`: Rendering of hits into a prompt context block

mod format;
pub mod model;
pub mod provider;

pub use format::format_for_context;
pub use model::{SearchHit, SearchOutcome};
pub use provider::SearchProvider;
