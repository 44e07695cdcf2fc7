use clap::Args;

use boppps_core::{GeneratedPlan, GenerationError, LessonPlanner, LessonRequest};

/// Lesson metadata for a one-shot generation.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Class, e.g. "9th"
    #[arg(long)]
    pub class: String,
    /// Subject, e.g. "Physics"
    #[arg(long)]
    pub subject: String,
    /// Lesson topic; the only field sent to the model
    #[arg(long)]
    pub topic: String,
    /// Number of students
    #[arg(long)]
    pub students: String,
    /// Duration in minutes
    #[arg(long)]
    pub duration: String,
    /// Lesson date
    #[arg(long)]
    pub date: String,
    /// Teacher name
    #[arg(long)]
    pub teacher: String,
}

impl From<GenerateArgs> for LessonRequest {
    fn from(args: GenerateArgs) -> Self {
        Self {
            class: args.class,
            subject: args.subject,
            topic: args.topic,
            students: args.students,
            duration: args.duration,
            date: args.date,
            teacher: args.teacher,
        }
    }
}

/// Run the pipeline once. The caller decides how to report the outcome.
pub async fn run_generate(
    planner: &LessonPlanner,
    args: GenerateArgs,
) -> Result<GeneratedPlan, GenerationError> {
    let request = LessonRequest::from(args);
    planner.generate(&request).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use boppps_core::output::OutputDir;
    use boppps_core::{LessonPlanner, PlannerConfig};
    use boppps_test_utils::{FailingClient, StubClient};
    use tempfile::TempDir;

    use super::*;

    fn args() -> GenerateArgs {
        GenerateArgs {
            class: "7th".into(),
            subject: "Biology".into(),
            topic: "Cells".into(),
            students: "25".into(),
            duration: "45".into(),
            date: "2025-06-01".into(),
            teacher: "Ms. Rivera".into(),
        }
    }

    #[test]
    fn args_map_onto_request_fields() {
        let request = LessonRequest::from(args());
        assert_eq!(request.class, "7th");
        assert_eq!(request.topic, "Cells");
        assert_eq!(request.students, "25");
        assert_eq!(request.teacher, "Ms. Rivera");
    }

    #[tokio::test]
    async fn run_generate_writes_document() {
        let tmp = TempDir::new().unwrap();
        let planner = LessonPlanner::new(
            Arc::new(StubClient::new("body")),
            PlannerConfig::default(),
            OutputDir::new(tmp.path(), Duration::ZERO),
        );

        let plan = run_generate(&planner, args()).await.unwrap();
        assert!(plan.path.exists());
        assert!(plan.file_name.starts_with("lesson_plan_"));
    }

    #[tokio::test]
    async fn run_generate_propagates_failure() {
        let tmp = TempDir::new().unwrap();
        let planner = LessonPlanner::new(
            Arc::new(FailingClient),
            PlannerConfig::default(),
            OutputDir::new(tmp.path(), Duration::ZERO),
        );

        let err = run_generate(&planner, args()).await.unwrap_err();
        assert!(err.user_message().starts_with("Error: "));
    }
}
