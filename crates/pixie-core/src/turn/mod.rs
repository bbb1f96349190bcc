//! Types describing a single question-to-answer turn.
//!
//! - `request`: The per-turn input value (`GenerationRequest`)
//! - `event`: What a running turn reports back (`StreamEvent`, `TaskStatus`)

mod event;
mod request;

pub use event::{StreamEvent, TaskStatus};
pub use request::GenerationRequest;
