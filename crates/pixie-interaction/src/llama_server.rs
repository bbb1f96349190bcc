//! LlamaServerBackend - inference over a local OpenAI-compatible server.
//!
//! Targets llama.cpp's `llama-server` (or anything exposing the same
//! `/v1/models` and `/v1/completions` endpoints). The weights live in the
//! server process; "loading" here means confirming the server is up and
//! finding out which model it serves.

use async_trait::async_trait;
use futures::{StreamExt, stream};
use pixie_core::error::{PixieError, Result};
use pixie_core::inference::{FragmentStream, GenerationParams, InferenceBackend, ModelHandle};
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt, retry};
use serde::{Deserialize, Serialize};

const MODELS_PATH: &str = "/v1/models";
const COMPLETIONS_PATH: &str = "/v1/completions";
const DONE_SENTINEL: &str = "[DONE]";

/// Inference backend that streams completions from a local HTTP server.
#[derive(Clone)]
pub struct LlamaServerBackend {
    client: Client,
    base_url: String,
}

impl LlamaServerBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl InferenceBackend for LlamaServerBackend {
    async fn load(&self, model_id: &str) -> Result<ModelHandle> {
        tracing::debug!("[LlamaServer] probing {}", self.url(MODELS_PATH));

        let response = self
            .client
            .get(self.url(MODELS_PATH))
            .send()
            .await
            .map_err(|err| {
                PixieError::model_load(
                    model_id,
                    format!("inference server unreachable at {}: {err}", self.base_url),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PixieError::model_load(
                model_id,
                format!("inference server returned {status}: {body}"),
            ));
        }

        let models: ModelList = response.json().await.map_err(|err| {
            PixieError::model_load(model_id, format!("invalid model list: {err}"))
        })?;

        let resolved_name = resolve_model_name(&models, model_id)
            .ok_or_else(|| PixieError::model_load(model_id, "server reports no models"))?;
        if resolved_name != model_id {
            tracing::info!(
                "[LlamaServer] '{}' not listed, using served model '{}'",
                model_id,
                resolved_name
            );
        }

        Ok(ModelHandle {
            model_id: model_id.to_string(),
            resolved_name,
        })
    }

    async fn stream_generate(
        &self,
        model: &ModelHandle,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<FragmentStream> {
        let body = CompletionRequest {
            model: &model.resolved_name,
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stream: true,
        };

        let mut source = self
            .client
            .post(self.url(COMPLETIONS_PATH))
            .json(&body)
            .eventsource()
            .map_err(|err| {
                PixieError::generation(format!("failed to open completion stream: {err}"))
            })?;
        source.set_retry_policy(Box::new(retry::Never));

        Ok(stream::unfold(Some(source), next_fragment).boxed())
    }
}

/// Pulls the next non-empty fragment out of the event source.
///
/// The state becomes `None` after an error so the stream ends right after
/// reporting it.
async fn next_fragment(
    state: Option<EventSource>,
) -> Option<(Result<String>, Option<EventSource>)> {
    let mut source = state?;
    loop {
        match source.next().await {
            None | Some(Err(reqwest_eventsource::Error::StreamEnded)) => return None,
            Some(Ok(Event::Open)) => continue,
            Some(Ok(Event::Message(message))) => match parse_sse_data(&message.data) {
                Ok(SseData::Done) => {
                    source.close();
                    return None;
                }
                Ok(SseData::Text(text)) if text.is_empty() => continue,
                Ok(SseData::Text(text)) => return Some((Ok(text), Some(source))),
                Err(err) => {
                    source.close();
                    return Some((Err(err), None));
                }
            },
            Some(Err(err)) => {
                source.close();
                return Some((
                    Err(PixieError::generation(format!("completion stream error: {err}"))),
                    None,
                ));
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseData {
    Text(String),
    Done,
}

fn parse_sse_data(data: &str) -> Result<SseData> {
    let data = data.trim();
    if data == DONE_SENTINEL {
        return Ok(SseData::Done);
    }

    let chunk: CompletionChunk = serde_json::from_str(data)
        .map_err(|err| PixieError::generation(format!("malformed completion chunk: {err}")))?;
    let text = chunk
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .unwrap_or_default();
    Ok(SseData::Text(text))
}

fn resolve_model_name(models: &ModelList, model_id: &str) -> Option<String> {
    models
        .data
        .iter()
        .find(|entry| entry.id == model_id)
        .or_else(|| models.data.first())
        .map(|entry| entry.id.clone())
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    text: String,
}
