//! The lesson plan pipeline: prompt, completion, document, file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::document;
use crate::error::GenerationError;
use crate::lesson::LessonRequest;
use crate::llm::{CompletionClient, CompletionRequest, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::output::{self, OutputDir};
use crate::prompt::build_prompt;

/// Model settings used for every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub model: String,
    pub temperature: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// A lesson plan written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlan {
    /// Absolute or root-relative path of the written document.
    pub path: PathBuf,
    /// Bare file name, e.g. `lesson_plan_20250525090507.docx`.
    pub file_name: String,
}

/// Runs the generation pipeline.
///
/// Built once at startup and shared; holds no per-request state.
pub struct LessonPlanner {
    client: Arc<dyn CompletionClient>,
    config: PlannerConfig,
    output: OutputDir,
}

impl LessonPlanner {
    pub fn new(client: Arc<dyn CompletionClient>, config: PlannerConfig, output: OutputDir) -> Self {
        Self {
            client,
            config,
            output,
        }
    }

    pub fn output(&self) -> &OutputDir {
        &self.output
    }

    /// Generate a lesson plan stamped with the current local time.
    pub async fn generate(&self, request: &LessonRequest) -> Result<GeneratedPlan, GenerationError> {
        self.generate_at(request, Local::now()).await
    }

    /// Generate a lesson plan whose file name is derived from `now`.
    ///
    /// Nothing is written unless the completion and the document assembly
    /// both succeed.
    pub async fn generate_at(
        &self,
        request: &LessonRequest,
        now: DateTime<Local>,
    ) -> Result<GeneratedPlan, GenerationError> {
        let completion = CompletionRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(&request.topic),
            temperature: self.config.temperature,
        };

        tracing::info!(
            client = self.client.name(),
            model = %completion.model,
            topic = %request.topic,
            "generating lesson plan"
        );

        let plan_text = self.client.complete(&completion).await?;
        let bytes = document::assemble(request, &plan_text)?;

        let evicted = self.output.evict_expired(SystemTime::from(now)).await;
        if evicted > 0 {
            tracing::info!(evicted, "removed expired lesson plans");
        }

        let file_name = output::file_name_for(now);
        let path = self.output.write(&file_name, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "lesson plan written");
        Ok(GeneratedPlan { path, file_name })
    }
}
