//! Error types for the PixieAI chat core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable category of a [`PixieError`].
///
/// Event consumers and tests match on the kind instead of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The search provider failed. Never leaves the search gateway.
    Search,
    /// The model could not be loaded.
    ModelLoad,
    /// Token generation failed after the model was loaded.
    Generation,
    /// A turn was submitted while another one was still running.
    ConcurrentSubmissionRejected,
    /// The request itself was unusable (e.g. an empty question).
    InvalidInput,
    Io,
    Serialization,
    Config,
    Internal,
}

/// A shared error type for the whole PixieAI workspace.
///
/// Errors are cloneable so that they can travel inside
/// [`StreamEvent::Failed`](crate::turn::StreamEvent::Failed) to the
/// presentation layer.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PixieError {
    /// Search provider failure (network, parse, rate limit)
    #[error("Search failed: {0}")]
    Search(String),

    /// Model load failure (missing weights, unreachable server, OOM)
    #[error("Failed to load model '{model_id}': {message}")]
    ModelLoad { model_id: String, message: String },

    /// Failure while streaming tokens from a loaded model
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A generation task is already outstanding for this session
    #[error("A response is still being generated; wait for it to finish")]
    TaskInProgress,

    /// The submitted question contained no text
    #[error("Question is empty")]
    EmptyQuestion,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PixieError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Search error
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search(message.into())
    }

    /// Creates a ModelLoad error
    pub fn model_load(model_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            model_id: model_id.into(),
            message: message.into(),
        }
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Returns the machine-readable category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Search(_) => ErrorKind::Search,
            Self::ModelLoad { .. } => ErrorKind::ModelLoad,
            Self::Generation(_) => ErrorKind::Generation,
            Self::TaskInProgress => ErrorKind::ConcurrentSubmissionRejected,
            Self::EmptyQuestion => ErrorKind::InvalidInput,
            Self::Io { .. } => ErrorKind::Io,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a ModelLoad error
    pub fn is_model_load(&self) -> bool {
        matches!(self, Self::ModelLoad { .. })
    }

    /// Check if this is a Generation error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Check if this error rejected a concurrent submission
    pub fn is_task_in_progress(&self) -> bool {
        matches!(self, Self::TaskInProgress)
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PixieError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PixieError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PixieError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PixieError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PixieError>`.
pub type Result<T> = std::result::Result<T, PixieError>;
