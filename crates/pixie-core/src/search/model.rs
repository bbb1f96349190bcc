//! Search domain models.

use serde::{Deserialize, Serialize};

use super::format::format_for_context;

/// A single ranked web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
        }
    }
}

/// What happened when a turn asked for web context.
///
/// Only `Found` produces prompt context. `Disabled`, `Failed` and
/// `NoResults` all collapse to "no context" downstream; they stay distinct
/// here so logs and status events can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The turn did not request search.
    Disabled,
    /// The provider raised; the reason is kept for logging only.
    Failed(String),
    /// The provider answered with zero results.
    NoResults,
    /// Ranked results, in provider order.
    Found(Vec<SearchHit>),
}

impl SearchOutcome {
    /// Number of hits that will reach the prompt.
    pub fn result_count(&self) -> usize {
        match self {
            SearchOutcome::Found(hits) => hits.len(),
            _ => 0,
        }
    }

    /// Collapses the outcome into the optional context block used by the prompt.
    pub fn into_context(self) -> Option<String> {
        match self {
            SearchOutcome::Found(hits) => format_for_context(&hits),
            SearchOutcome::Disabled | SearchOutcome::Failed(_) | SearchOutcome::NoResults => None,
        }
    }
}
