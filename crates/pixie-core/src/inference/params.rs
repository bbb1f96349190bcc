use serde::{Deserialize, Serialize};

/// Sampling options handed to the inference capability as-is.
///
/// No range validation happens here; out-of-range values are the
/// capability's to reject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// Upper bound on the number of emitted fragments
    pub max_tokens: usize,
    /// Sampling randomness (0 is near-deterministic)
    pub temperature: f32,
    /// Nucleus sampling probability mass cutoff
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}
