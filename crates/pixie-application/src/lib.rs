//! Turn orchestration for the PixieAI chat core.
//!
//! [`ChatSession`] owns the conversation and starts one [`GenerationTask`]
//! per question. The task drives [`SearchGateway`] and [`InferenceEngine`]
//! on a background tokio task and reports back over a channel.

pub mod chat_session;
pub mod engine;
pub mod generation_task;
pub mod search_gateway;

#[cfg(test)]
mod test_support;

pub use chat_session::ChatSession;
pub use engine::InferenceEngine;
pub use generation_task::{GenerationTask, TurnServices};
pub use search_gateway::SearchGateway;
