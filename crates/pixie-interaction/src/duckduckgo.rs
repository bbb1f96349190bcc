//! DuckDuckGoSearch - web search via the DuckDuckGo HTML results page.
//!
//! The HTML endpoint returns ordinary web results (title, snippet, link).
//! When it yields nothing, the instant-answer JSON API is tried instead.

use async_trait::async_trait;
use pixie_core::error::{PixieError, Result};
use pixie_core::search::{SearchHit, SearchProvider};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use serde_json::Value;
use std::time::Duration;
use url::Url;

const HTML_URL: &str = "https://html.duckduckgo.com/html/";
const INSTANT_ANSWER_URL: &str = "https://api.duckduckgo.com/";
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; pixie/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Search provider backed by DuckDuckGo.
#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    html_endpoint: String,
    instant_answer_endpoint: String,
}

impl DuckDuckGoSearch {
    /// Creates a provider whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| PixieError::search(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            html_endpoint: HTML_URL.to_string(),
            instant_answer_endpoint: INSTANT_ANSWER_URL.to_string(),
        })
    }

    /// Overrides the HTML results endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.html_endpoint = endpoint.into();
        self
    }

    /// Overrides the instant-answer fallback endpoint.
    pub fn with_instant_answer_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.instant_answer_endpoint = endpoint.into();
        self
    }

    async fn html_results(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(&self.html_endpoint)
            .form(&[("q", query), ("b", ""), ("kl", "wt-wt")])
            .send()
            .await
            .map_err(|err| PixieError::search(format!("DuckDuckGo request failed: {err}")))?;

        // 202 is the rate-limit page, not results
        let status = response.status();
        if !status.is_success() || status == StatusCode::ACCEPTED {
            return Err(PixieError::search(format!("DuckDuckGo returned {status}")));
        }

        let page = response
            .text()
            .await
            .map_err(|err| PixieError::search(format!("unreadable DuckDuckGo page: {err}")))?;
        Ok(parse_html_results(&page))
    }

    async fn instant_answer(&self, query: &str) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.instant_answer_endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|err| PixieError::search(format!("DuckDuckGo request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PixieError::search(format!("DuckDuckGo returned {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| PixieError::search(format!("invalid DuckDuckGo response: {err}")))?;
        Ok(parse_instant_answer(&body))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn text(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let mut hits = match self.html_results(query).await {
            Ok(hits) if !hits.is_empty() => hits,
            Ok(_) => {
                tracing::debug!("[DuckDuckGo] no web results, trying instant answer");
                self.instant_answer(query).await?
            }
            Err(err) => {
                tracing::warn!("[DuckDuckGo] web results unavailable: {}", err);
                self.instant_answer(query).await.map_err(|_| err)?
            }
        };

        hits.truncate(max_results);
        tracing::debug!("[DuckDuckGo] {} hits for {:?}", hits.len(), query);
        Ok(hits)
    }
}

/// Extracts organic results in page order. Ads and entries without a
/// usable link are skipped.
fn parse_html_results(page: &str) -> Vec<SearchHit> {
    let (Ok(result), Ok(link), Ok(snippet)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let document = Html::parse_document(page);
    document
        .select(&result)
        .filter(|node| !node.value().classes().any(|class| class == "result--ad"))
        .filter_map(|node| {
            let anchor = node.select(&link).next()?;
            let title = collapse_whitespace(anchor.text());
            let url = resolve_link(anchor.value().attr("href")?)?;
            if title.is_empty() {
                return None;
            }
            let body = node
                .select(&snippet)
                .next()
                .map(|s| collapse_whitespace(s.text()))
                .unwrap_or_default();
            Some(SearchHit::new(title, body, url))
        })
        .collect()
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns a result href into the target URL.
///
/// Result links are usually `//duckduckgo.com/l/?uddg=<target>&rut=...`
/// redirects; the target is decoded from `uddg`. Relative links yield `None`.
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;

    if parsed.path() == "/l/" {
        if let Some((_, target)) = parsed.query_pairs().find(|(key, _)| *key == "uddg") {
            return Some(target.into_owned());
        }
    }
    Some(absolute)
}

/// Extracts hits in relevance order: the abstract, direct results, then
/// related topics with nested topic groups flattened.
fn parse_instant_answer(body: &Value) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    let abstract_text = str_field(body, "AbstractText");
    if !abstract_text.is_empty() {
        let heading = str_field(body, "Heading");
        let title = if heading.is_empty() {
            str_field(body, "AbstractSource")
        } else {
            heading
        };
        hits.push(SearchHit::new(title, abstract_text, str_field(body, "AbstractURL")));
    }

    if let Some(results) = body.get("Results").and_then(Value::as_array) {
        hits.extend(results.iter().filter_map(topic_hit));
    }

    if let Some(topics) = body.get("RelatedTopics").and_then(Value::as_array) {
        collect_topics(topics, &mut hits);
    }

    hits
}

fn collect_topics(topics: &[Value], hits: &mut Vec<SearchHit>) {
    for topic in topics {
        match topic.get("Topics").and_then(Value::as_array) {
            Some(group) => collect_topics(group, hits),
            None => hits.extend(topic_hit(topic)),
        }
    }
}

fn topic_hit(topic: &Value) -> Option<SearchHit> {
    let text = str_field(topic, "Text");
    let url = str_field(topic, "FirstURL");
    if text.is_empty() || url.is_empty() {
        return None;
    }

    // Topic text reads "Title - description"
    let title = text.split(" - ").next().unwrap_or(text).trim();
    Some(SearchHit::new(title, text, url))
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}
