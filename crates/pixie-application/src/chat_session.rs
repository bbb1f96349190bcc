//! Interactive-context owner of a conversation.
//!
//! A `ChatSession` is driven from one place (the front end's loop). It
//! accepts a question, hands it to a background [`GenerationTask`] and
//! forwards that task's events. History is only touched here, and only when
//! a turn completes.

use pixie_core::conversation::{ConversationHistory, ConversationTurn};
use pixie_core::error::{PixieError, Result};
use pixie_core::turn::{GenerationRequest, StreamEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::generation_task::{GenerationTask, TurnServices};

struct PendingTurn {
    request: GenerationRequest,
    events: UnboundedReceiver<StreamEvent>,
    worker: JoinHandle<()>,
}

pub struct ChatSession {
    services: TurnServices,
    history: ConversationHistory,
    pending: Option<PendingTurn>,
}

impl ChatSession {
    pub fn new(services: TurnServices) -> Self {
        Self {
            services,
            history: ConversationHistory::new(),
            pending: None,
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn services(&self) -> &TurnServices {
        &self.services
    }

    /// True while a submitted turn has not yet delivered its terminal event.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a turn for `question` in the background.
    ///
    /// The question is trimmed before use. Returns the turn's request id.
    ///
    /// # Errors
    ///
    /// - [`PixieError::TaskInProgress`] if an earlier turn is still running
    /// - [`PixieError::EmptyQuestion`] if `question` is blank
    pub fn submit(&mut self, question: &str, use_search: bool) -> Result<Uuid> {
        if self.pending.is_some() {
            tracing::warn!("[ChatSession] Rejected submission: a turn is already running");
            return Err(PixieError::TaskInProgress);
        }

        let question = question.trim();
        if question.is_empty() {
            return Err(PixieError::EmptyQuestion);
        }

        let request = GenerationRequest::new(question, use_search);
        let (tx, rx) = mpsc::unbounded_channel();
        let task = GenerationTask::new(
            request.clone(),
            self.history.window().to_vec(),
            self.services.clone(),
            tx,
        );

        tracing::debug!("[ChatSession] Submitting turn {}", request.id);
        let worker = task.spawn();
        let id = request.id;
        self.pending = Some(PendingTurn {
            request,
            events: rx,
            worker,
        });
        Ok(id)
    }

    /// Waits for the next event of the running turn.
    ///
    /// Returns `None` when no turn is running. After a terminal event the
    /// session is idle again; on `Completed` the question and answer have
    /// already been appended to the history.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let pending = self.pending.as_mut()?;

        let event = match pending.events.recv().await {
            Some(event) => event,
            None => StreamEvent::Failed(PixieError::internal(
                "generation task ended without a result",
            )),
        };

        if event.is_terminal() {
            self.finish_turn(&event);
        }
        Some(event)
    }

    /// Submits `question` and drains its events, calling `on_event` for each.
    ///
    /// Returns the full answer, or the error carried by `Failed`.
    pub async fn run_turn<F>(
        &mut self,
        question: &str,
        use_search: bool,
        mut on_event: F,
    ) -> Result<String>
    where
        F: FnMut(&StreamEvent),
    {
        self.submit(question, use_search)?;

        while let Some(event) = self.next_event().await {
            on_event(&event);
            match event {
                StreamEvent::Completed(text) => return Ok(text),
                StreamEvent::Failed(err) => return Err(err),
                _ => {}
            }
        }

        Err(PixieError::internal("turn ended without a terminal event"))
    }

    fn finish_turn(&mut self, event: &StreamEvent) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        match event {
            StreamEvent::Completed(answer) => {
                self.history.push(ConversationTurn::user(pending.request.question));
                self.history.push(ConversationTurn::assistant(answer.clone()));
                tracing::info!(
                    "[ChatSession] Turn {} completed, history now {} entries",
                    pending.request.id,
                    self.history.len()
                );
            }
            StreamEvent::Failed(err) => {
                tracing::warn!(
                    "[ChatSession] Turn {} failed ({:?}), history unchanged",
                    pending.request.id,
                    err.kind()
                );
            }
            _ => {}
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("[ChatSession] Dropped with turn {} running", pending.request.id);
            pending.worker.abort();
        }
    }
}
