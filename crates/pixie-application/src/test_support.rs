//! In-memory capability doubles shared by the unit tests.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use pixie_core::error::{PixieError, Result};
use pixie_core::inference::{FragmentStream, GenerationParams, InferenceBackend, ModelHandle};
use pixie_core::persona::Persona;
use pixie_core::prompt::PromptBuilder;
use pixie_core::search::{SearchHit, SearchProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::engine::InferenceEngine;
use crate::generation_task::TurnServices;
use crate::search_gateway::SearchGateway;

pub fn hit(title: &str) -> SearchHit {
    SearchHit::new(
        title,
        format!("About {title}"),
        format!("https://example.com/{title}"),
    )
}

pub struct StaticSearchProvider {
    hits: Vec<SearchHit>,
}

impl StaticSearchProvider {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    async fn text(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

pub struct FailingSearchProvider;

#[async_trait]
impl SearchProvider for FailingSearchProvider {
    async fn text(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>> {
        Err(PixieError::search("connection refused"))
    }
}

/// Backend that replays a fixed list of fragments.
pub struct ScriptedBackend {
    fragments: Vec<String>,
    failing_loads: AtomicUsize,
    load_calls: AtomicUsize,
    load_delay: Duration,
    stream_error_after: Option<usize>,
    gate: Option<Arc<Notify>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failing_loads: AtomicUsize::new(0),
            load_calls: AtomicUsize::new(0),
            load_delay: Duration::ZERO,
            stream_error_after: None,
            gate: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The first `count` loads fail.
    pub fn with_failing_loads(self, count: usize) -> Self {
        self.failing_loads.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Yields `count` fragments, then an error.
    pub fn with_stream_error_after(mut self, count: usize) -> Self {
        self.stream_error_after = Some(count);
        self
    }

    /// Generation waits until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn load(&self, model_id: &str) -> Result<ModelHandle> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        let should_fail = self
            .failing_loads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(PixieError::model_load(model_id, "weights not found"));
        }

        Ok(ModelHandle {
            model_id: model_id.to_string(),
            resolved_name: format!("{model_id} (scripted)"),
        })
    }

    async fn stream_generate(
        &self,
        _model: &ModelHandle,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<FragmentStream> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let mut items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        if let Some(count) = self.stream_error_after {
            items.truncate(count);
            items.push(Err(PixieError::generation("sampler crashed")));
        }

        Ok(stream::iter(items).boxed())
    }
}

pub fn services(
    backend: Arc<ScriptedBackend>,
    provider: Arc<dyn SearchProvider>,
) -> TurnServices {
    TurnServices {
        engine: Arc::new(InferenceEngine::new(backend, "gemma-test")),
        search: SearchGateway::new(provider, 5),
        prompt_builder: PromptBuilder::new(Persona::default()),
        params: GenerationParams::default(),
    }
}
