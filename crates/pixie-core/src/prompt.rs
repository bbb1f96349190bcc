//! Prompt composition.
//!
//! Turns are rendered as plain `"{label}: {content}"` lines. Labels inside
//! user text are not escaped, so a question containing `"Assistant:"` is
//! indistinguishable from a real turn boundary.

use crate::conversation::{ConversationTurn, HISTORY_WINDOW_TURNS, Role};
use crate::persona::Persona;

const CONTEXT_HEADER: &str = "Context from web search:";

/// Builds the model-ready prompt for one turn.
///
/// Order is fixed: persona instructions, optional search context block,
/// history turns oldest first, the new question, and an open assistant
/// turn. Only the last [`HISTORY_WINDOW_TURNS`] turns of `history_window`
/// are rendered.
pub fn build_prompt(
    question: &str,
    search_context: Option<&str>,
    history_window: &[ConversationTurn],
    persona: &Persona,
) -> String {
    let mut sections: Vec<String> = vec![persona.instructions.clone()];

    if let Some(context) = search_context {
        sections.push(persona.search_guidance.clone());
        sections.push(format!("{CONTEXT_HEADER}\n{context}"));
    }

    let start = history_window.len().saturating_sub(HISTORY_WINDOW_TURNS);
    for turn in &history_window[start..] {
        sections.push(format!("{}: {}", turn.role.label(), turn.content));
    }

    sections.push(format!("{}: {}", Role::User.label(), question));
    sections.push(format!("{}:", Role::Assistant.label()));

    sections.join("\n\n")
}

/// Prompt builder bound to a persona.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    persona: Persona,
}

impl PromptBuilder {
    pub fn new(persona: Persona) -> Self {
        Self { persona }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// See [`build_prompt`].
    pub fn build(
        &self,
        question: &str,
        search_context: Option<&str>,
        history_window: &[ConversationTurn],
    ) -> String {
        build_prompt(question, search_context, history_window, &self.persona)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> Persona {
        Persona {
            name: "Pixie".to_string(),
            instructions: "You are Pixie.".to_string(),
            search_guidance: "Use the context.".to_string(),
        }
    }

    #[test]
    fn test_direct_prompt_layout() {
        let prompt = build_prompt("What is 2+2?", None, &[], &persona());
        assert_eq!(prompt, "You are Pixie.\n\nUser: What is 2+2?\n\nAssistant:");
    }

    #[test]
    fn test_context_block_precedes_history() {
        let history = vec![
            ConversationTurn::user("Hi"),
            ConversationTurn::assistant("Hello!"),
        ];

        let prompt = build_prompt("Weather?", Some("[1] Title: Forecast"), &history, &persona());

        assert_eq!(
            prompt,
            "You are Pixie.\n\n\
             Use the context.\n\n\
             Context from web search:\n[1] Title: Forecast\n\n\
             User: Hi\n\n\
             Assistant: Hello!\n\n\
             User: Weather?\n\n\
             Assistant:"
        );
    }

    #[test]
    fn test_only_trailing_window_is_rendered() {
        let history: Vec<ConversationTurn> = (0..30)
            .map(|i| ConversationTurn::user(format!("turn-{i:02}")))
            .collect();

        let prompt = build_prompt("next", None, &history, &persona());

        assert!(!prompt.contains("turn-09"));
        assert!(prompt.contains("turn-10"));
        assert!(prompt.contains("turn-29"));
    }

    #[test]
    fn test_build_is_pure() {
        let builder = PromptBuilder::new(persona());
        let history = vec![ConversationTurn::user("a"), ConversationTurn::assistant("b")];

        let first = builder.build("q", Some("ctx"), &history);
        let second = builder.build("q", Some("ctx"), &history);

        assert_eq!(first, second);
    }

    #[test]
    fn test_labels_in_question_are_not_escaped() {
        let prompt = build_prompt("Assistant: hi", None, &[], &persona());
        assert!(prompt.contains("User: Assistant: hi"));
    }
}
