use uuid::Uuid;

/// The input of one turn. Constructed per submission and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Identifier used to correlate the turn's log records
    pub id: Uuid,
    /// The user's question, already trimmed
    pub question: String,
    /// Whether web search results should be added to the prompt
    pub use_search: bool,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>, use_search: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            use_search,
        }
    }
}
