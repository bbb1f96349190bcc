//! Model lifecycle and generation over the inference capability.
//!
//! The engine is created once per process and shared by every turn. It
//! owns the [`ModelState`] and serialises loads with an internal mutex, so
//! concurrent callers trigger at most one backend load.

use futures::StreamExt;
use pixie_core::error::{PixieError, Result};
use pixie_core::inference::{
    FragmentStream, GenerationParams, InferenceBackend, ModelHandle, ModelState,
    filter_control_markers,
};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;

/// Owns the process-wide model handle.
pub struct InferenceEngine {
    backend: Arc<dyn InferenceBackend>,
    model_id: String,
    state: RwLock<ModelState>,
    /// Held for the whole duration of a load
    load_lock: Mutex<()>,
}

impl InferenceEngine {
    /// Creates an engine in the `Unloaded` state. Nothing is loaded until
    /// [`load`](Self::load) or the first generation.
    pub fn new(backend: Arc<dyn InferenceBackend>, model_id: impl Into<String>) -> Self {
        Self {
            backend,
            model_id: model_id.into(),
            state: RwLock::new(ModelState::Unloaded),
            load_lock: Mutex::new(()),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Snapshot of the model lifecycle state.
    pub fn state(&self) -> ModelState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_loaded()
    }

    fn set_state(&self, state: ModelState) {
        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// Loads the model, or returns the existing handle if already loaded.
    ///
    /// # Errors
    ///
    /// Returns [`PixieError::ModelLoad`] when the backend fails. The engine
    /// is left in `Failed` and the next call tries again.
    pub async fn load(&self) -> Result<ModelHandle> {
        let _guard = self.load_lock.lock().await;

        if let ModelState::Loaded(handle) = self.state() {
            return Ok(handle);
        }

        self.set_state(ModelState::Loading);
        tracing::info!("[InferenceEngine] Loading model: {}", self.model_id);
        let started = Instant::now();

        match self.backend.load(&self.model_id).await {
            Ok(handle) => {
                tracing::info!(
                    "[InferenceEngine] Model loaded: {} ({:.1}s)",
                    handle.resolved_name,
                    started.elapsed().as_secs_f32()
                );
                self.set_state(ModelState::Loaded(handle.clone()));
                Ok(handle)
            }
            Err(err) => {
                let err = match err {
                    PixieError::ModelLoad { .. } => err,
                    other => PixieError::model_load(&self.model_id, other.to_string()),
                };
                tracing::error!("[InferenceEngine] {}", err);
                self.set_state(ModelState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Starts one generation pass and returns its fragments.
    ///
    /// Control markers are removed, an end-of-turn marker ends the stream,
    /// and at most `params.max_tokens` fragments are yielded. Loads the
    /// model first if needed.
    pub async fn generate_stream(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<FragmentStream> {
        let handle = match self.state() {
            ModelState::Loaded(handle) => handle,
            _ => self.load().await?,
        };

        tracing::debug!(
            "[InferenceEngine] generate: prompt_chars={} max_tokens={} temperature={} top_p={}",
            prompt.len(),
            params.max_tokens,
            params.temperature,
            params.top_p
        );

        let raw = self
            .backend
            .stream_generate(&handle, prompt, params)
            .await
            .map_err(as_generation_error)?;

        let fragments = filter_control_markers(raw)
            .map(|item| item.map_err(as_generation_error))
            .take(params.max_tokens)
            .boxed();

        Ok(fragments)
    }

    /// Non-streaming form of [`generate_stream`](Self::generate_stream).
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let mut fragments = self.generate_stream(prompt, params).await?;
        let mut text = String::new();
        while let Some(fragment) = fragments.next().await {
            text.push_str(&fragment?);
        }
        Ok(text)
    }
}

fn as_generation_error(err: PixieError) -> PixieError {
    match err {
        PixieError::Generation(_) | PixieError::ModelLoad { .. } => err,
        other => PixieError::generation(other.to_string()),
    }
}
