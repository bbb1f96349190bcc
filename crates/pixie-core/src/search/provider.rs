//! Search provider trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::search::SearchHit;

/// External web search capability.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Runs a text search.
    ///
    /// # Arguments
    /// * `query` - The search query string
    /// * `max_results` - Upper bound on the number of hits returned
    ///
    /// # Returns
    /// Hits ordered by provider relevance. Implementations may return an
    /// error for network, parse or rate-limit failures; callers decide
    /// whether to surface it.
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
