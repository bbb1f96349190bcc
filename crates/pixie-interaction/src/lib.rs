//! Network adapters for the chat core capabilities.
//!
//! - `llama_server`: [`InferenceBackend`](pixie_core::inference::InferenceBackend)
//!   over a local OpenAI-compatible completion server
//! - `duckduckgo`: [`SearchProvider`](pixie_core::search::SearchProvider)
//!   over DuckDuckGo web results, with the instant-answer API as fallback

pub mod duckduckgo;
pub mod llama_server;

pub use duckduckgo::DuckDuckGoSearch;
pub use llama_server::LlamaServerBackend;
