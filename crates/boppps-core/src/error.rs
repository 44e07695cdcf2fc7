//! Errors surfaced by the lesson plan pipeline.

use crate::document::DocumentError;
use crate::llm::CompletionError;

/// Why a lesson plan could not be produced.
///
/// The variants keep the failing stage for logs. Users always see the same
/// shape of message, see [`GenerationError::user_message`].
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl GenerationError {
    /// `"Error: <details>"`, the text shown in place of a download.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }

    /// Short stage name for structured logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Completion(_) => "completion",
            Self::Document(_) => "document",
        }
    }
}
