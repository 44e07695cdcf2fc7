//! Language model access.
//!
//! The pipeline only talks to [`CompletionClient`]; the HTTP transport
//! lives in [`ChatCompletionsClient`]. Tests swap in stub clients.
//!
//! ```text
//! LessonPlanner --complete(&CompletionRequest)--> &dyn CompletionClient
//!                                                     |
//!                                   ChatCompletionsClient (reqwest)
//!                                                     |
//!                                POST <base_url>/chat/completions
//! ```

pub mod chat_completions;
pub mod client;
pub mod types;

pub use chat_completions::ChatCompletionsClient;
pub use client::CompletionClient;
pub use types::{CompletionError, CompletionRequest};

/// Endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used when no model is configured.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Sampling temperature for lesson plan generation.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
