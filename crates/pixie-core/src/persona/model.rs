//! Persona domain model.

use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "PixieAI";
const DEFAULT_INSTRUCTIONS: &str =
    "You are PixieAI, a helpful AI assistant. Be concise, informative, and friendly.";
const DEFAULT_SEARCH_GUIDANCE: &str = "Answer the user's question based on the provided search \
    context. If the context doesn't contain relevant information, say so and provide your best \
    answer.";

/// The identity and tone of the assistant.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Persona {
    /// Display name of the assistant
    pub name: String,
    /// System text that opens every prompt
    pub instructions: String,
    /// Extra instruction added only when search context is present
    pub search_guidance: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            search_guidance: DEFAULT_SEARCH_GUIDANCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_persona_keeps_defaults() {
        let persona: Persona = toml::from_str("name = \"Pip\"").unwrap();
        assert_eq!(persona.name, "Pip");
        assert_eq!(persona.instructions, DEFAULT_INSTRUCTIONS);
    }
}
