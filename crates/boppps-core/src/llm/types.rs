//! Request and error types shared by completion clients.

pub use reqwest::StatusCode;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier understood by the remote service.
    pub model: String,
    /// The full user prompt.
    pub prompt: String,
    pub temperature: f64,
}

/// Everything that can go wrong during a completion call.
///
/// Callers are not expected to branch on the variant; the pipeline reports
/// all of them the same way.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("request to completion service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion response contained no message content")]
    EmptyResponse,
}
