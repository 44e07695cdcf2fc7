//! Core pipeline for the BOPPPS lesson plan generator.
//!
//! ```text
//! LessonRequest --topic--> prompt::build_prompt
//!                               |
//!                               v
//!                  CompletionClient::complete  (one remote call)
//!                               |
//!                               v
//!       document::assemble(request, text) --> OutputDir::write
//!                               |
//!                               v
//!                  GeneratedPlan { path, file_name }
//! ```
//!
//! [`pipeline::LessonPlanner`] wires the stages together.

pub mod document;
pub mod error;
pub mod lesson;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompt;

pub use error::GenerationError;
pub use lesson::LessonRequest;
pub use pipeline::{GeneratedPlan, LessonPlanner, PlannerConfig};
