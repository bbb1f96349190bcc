//! Web search wrapper that never fails.
//!
//! Provider errors are logged and turned into "no results" here; nothing
//! downstream ever sees a search error.

use pixie_core::search::{SearchHit, SearchOutcome, SearchProvider, format_for_context};
use std::sync::Arc;

/// Wraps the external search capability for use inside a turn.
#[derive(Clone)]
pub struct SearchGateway {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl SearchGateway {
    /// Creates a gateway with the default result cap used by [`lookup`](Self::lookup).
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    /// Searches for `query`, returning at most `limit` hits in provider order.
    ///
    /// Any provider failure yields an empty list.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        match self.fetch(query, limit).await {
            Ok(hits) => hits,
            Err(reason) => {
                tracing::warn!(
                    "[SearchGateway] search failed, continuing without context: {}",
                    reason
                );
                Vec::new()
            }
        }
    }

    /// Searches and reports which of the no-context cases happened.
    pub async fn lookup(&self, query: &str) -> SearchOutcome {
        match self.fetch(query, self.max_results).await {
            Ok(hits) if hits.is_empty() => {
                tracing::info!("[SearchGateway] no results for query");
                SearchOutcome::NoResults
            }
            Ok(hits) => {
                tracing::info!("[SearchGateway] {} results", hits.len());
                SearchOutcome::Found(hits)
            }
            Err(reason) => {
                tracing::warn!(
                    "[SearchGateway] search failed, continuing without context: {}",
                    reason
                );
                SearchOutcome::Failed(reason)
            }
        }
    }

    /// Renders hits into a prompt context block; `None` when `results` is empty.
    pub fn format_for_context(results: &[SearchHit]) -> Option<String> {
        format_for_context(results)
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, String> {
        tracing::debug!("[SearchGateway] query={:?} limit={}", query, limit);
        let mut hits = self
            .provider
            .text(query, limit)
            .await
            .map_err(|e| e.to_string())?;
        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingSearchProvider, StaticSearchProvider, hit};

    #[tokio::test]
    async fn test_search_returns_provider_order_capped() {
        let provider = StaticSearchProvider::new(vec![hit("a"), hit("b"), hit("c")]);
        let gateway = SearchGateway::new(Arc::new(provider), 5);

        let hits = gateway.search("rust", 2).await;

        let titles: Vec<&str> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failing_provider_degrades_to_empty() {
        let gateway = SearchGateway::new(Arc::new(FailingSearchProvider), 5);

        let hits = gateway.search("anything", 5).await;

        assert!(hits.is_empty());
        assert_eq!(SearchGateway::format_for_context(&hits), None);
    }

    #[tokio::test]
    async fn test_lookup_distinguishes_failure_from_empty() {
        let failing = SearchGateway::new(Arc::new(FailingSearchProvider), 5);
        let empty = SearchGateway::new(Arc::new(StaticSearchProvider::new(vec![])), 5);

        assert!(matches!(failing.lookup("q").await, SearchOutcome::Failed(_)));
        assert_eq!(empty.lookup("q").await, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn test_lookup_uses_default_cap() {
        let provider = StaticSearchProvider::new(vec![hit("a"), hit("b"), hit("c")]);
        let gateway = SearchGateway::new(Arc::new(provider), 2);

        assert_eq!(gateway.lookup("q").await.result_count(), 2);
    }
}
