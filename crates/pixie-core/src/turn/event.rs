use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PixieError;

/// Progress reported by a running turn before tokens start to flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskStatus {
    /// The web search request is in flight.
    SearchingWeb,
    /// Search returned results that will be added to the prompt.
    SearchContextFound { results: usize },
    /// Search failed or returned nothing; generation continues without context.
    SearchNoResults,
    /// The model is being loaded (first turn, or retry after a failed load).
    LoadingModel,
    /// The prompt was handed to the model and tokens are about to stream.
    Generating,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::SearchingWeb => write!(f, "Searching the web..."),
            TaskStatus::SearchContextFound { results } => {
                write!(f, "Search complete ({results} results).")
            }
            TaskStatus::SearchNoResults => write!(f, "No search results."),
            TaskStatus::LoadingModel => {
                write!(f, "Loading model (first run may take a minute)...")
            }
            TaskStatus::Generating => write!(f, "Generating response..."),
        }
    }
}

/// Events emitted by a generation task, in strict order:
/// zero or more `StatusChanged`, zero or more `TokenProduced`, then exactly
/// one of `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    StatusChanged(TaskStatus),
    TokenProduced(String),
    /// Carries the concatenation of every `TokenProduced` payload of the turn.
    Completed(String),
    Failed(PixieError),
}

impl StreamEvent {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Failed(_))
    }
}
