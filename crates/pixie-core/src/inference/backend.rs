use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::params::GenerationParams;
use crate::error::Result;

/// A lazy, finite, non-restartable sequence of generated text fragments.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Descriptor of a model that the backend has made ready for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// The identifier the model was requested with
    pub model_id: String,
    /// The name the backend reported for the loaded weights
    pub resolved_name: String,
}

/// Lifecycle of the process-wide model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loading,
    Loaded(ModelHandle),
    /// The last load attempt failed; the next load retries.
    Failed(String),
}

impl ModelState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }
}

/// External inference capability (local weights + sampler).
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Loads the model identified by `model_id`.
    ///
    /// May take minutes on first run. Errors should be
    /// [`PixieError::ModelLoad`](crate::error::PixieError::ModelLoad).
    async fn load(&self, model_id: &str) -> Result<ModelHandle>;

    /// Starts one generation pass over `prompt`.
    ///
    /// The returned stream yields raw fragments, control markers included.
    async fn stream_generate(
        &self,
        model: &ModelHandle,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<FragmentStream>;
}
