//! Background execution of a single turn.
//!
//! A [`GenerationTask`] runs off the interactive context on its own tokio
//! task. It never touches conversation history; everything it learns is
//! sent back as [`StreamEvent`]s, ending with exactly one terminal event.

use futures::StreamExt;
use pixie_core::conversation::ConversationTurn;
use pixie_core::error::Result;
use pixie_core::inference::GenerationParams;
use pixie_core::prompt::PromptBuilder;
use pixie_core::search::SearchOutcome;
use pixie_core::turn::{GenerationRequest, StreamEvent, TaskStatus};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::engine::InferenceEngine;
use crate::search_gateway::SearchGateway;

/// Long-lived collaborators a turn needs. Cloned into every task.
#[derive(Clone)]
pub struct TurnServices {
    pub engine: Arc<InferenceEngine>,
    pub search: SearchGateway,
    pub prompt_builder: PromptBuilder,
    pub params: GenerationParams,
}

/// Internal progress of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskPhase {
    Idle,
    SearchingWeb,
    LoadingModel,
    Streaming,
    Completed,
    Failed,
}

pub struct GenerationTask {
    request: GenerationRequest,
    history_window: Vec<ConversationTurn>,
    services: TurnServices,
    events: UnboundedSender<StreamEvent>,
    phase: TaskPhase,
}

impl GenerationTask {
    /// `history_window` is a snapshot taken at submission time; later
    /// changes to the conversation do not reach this task.
    pub fn new(
        request: GenerationRequest,
        history_window: Vec<ConversationTurn>,
        services: TurnServices,
        events: UnboundedSender<StreamEvent>,
    ) -> Self {
        Self {
            request,
            history_window,
            services,
            events,
            phase: TaskPhase::Idle,
        }
    }

    /// Runs the task on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        let span = tracing::info_span!("turn", id = %self.request.id);
        tokio::spawn(self.run().instrument(span))
    }

    /// Drives the turn to its terminal event.
    pub async fn run(mut self) {
        let started = Instant::now();
        tracing::info!(
            "[GenerationTask] Starting turn (search={}, history_turns={})",
            self.request.use_search,
            self.history_window.len()
        );

        let terminal = match self.execute().await {
            Ok(full_text) => {
                self.enter(TaskPhase::Completed);
                tracing::info!(
                    "[GenerationTask] Completed: {} chars in {:.1}s",
                    full_text.len(),
                    started.elapsed().as_secs_f32()
                );
                StreamEvent::Completed(full_text)
            }
            Err(err) => {
                self.enter(TaskPhase::Failed);
                tracing::error!("[GenerationTask] Failed: {}", err);
                StreamEvent::Failed(err)
            }
        };

        self.emit(terminal);
    }

    async fn execute(&mut self) -> Result<String> {
        let outcome = if self.request.use_search {
            self.enter(TaskPhase::SearchingWeb);
            self.emit(StreamEvent::StatusChanged(TaskStatus::SearchingWeb));

            let outcome = self.services.search.lookup(&self.request.question).await;
            let status = match &outcome {
                SearchOutcome::Found(hits) => TaskStatus::SearchContextFound {
                    results: hits.len(),
                },
                _ => TaskStatus::SearchNoResults,
            };
            self.emit(StreamEvent::StatusChanged(status));
            outcome
        } else {
            SearchOutcome::Disabled
        };
        let context = outcome.into_context();

        if !self.services.engine.is_loaded() {
            self.enter(TaskPhase::LoadingModel);
            self.emit(StreamEvent::StatusChanged(TaskStatus::LoadingModel));
            self.services.engine.load().await?;
        }

        let prompt = self.services.prompt_builder.build(
            &self.request.question,
            context.as_deref(),
            &self.history_window,
        );

        self.enter(TaskPhase::Streaming);
        self.emit(StreamEvent::StatusChanged(TaskStatus::Generating));

        let mut fragments = self
            .services
            .engine
            .generate_stream(&prompt, &self.services.params)
            .await?;

        let mut full_text = String::new();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            if fragment.is_empty() {
                continue;
            }
            full_text.push_str(&fragment);
            self.emit(StreamEvent::TokenProduced(fragment));
        }

        Ok(full_text)
    }

    fn enter(&mut self, phase: TaskPhase) {
        tracing::debug!("[GenerationTask] {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn emit(&self, event: StreamEvent) {
        // A closed receiver means the session was dropped; keep running to
        // the end so the model is left in a consistent state.
        if self.events.send(event).is_err() {
            tracing::debug!("[GenerationTask] event receiver dropped");
        }
    }
}
