//! Shared test doubles for boppps tests.
//!
//! The real completion client is non-deterministic and needs network
//! access, so pipeline and server tests substitute one of these.

use std::sync::Mutex;

use async_trait::async_trait;

use boppps_core::LessonRequest;
use boppps_core::llm::types::StatusCode;
use boppps_core::llm::{CompletionClient, CompletionError, CompletionRequest};

/// A fully populated request matching the form placeholders.
pub fn sample_request() -> LessonRequest {
    LessonRequest {
        class: "9th".to_string(),
        subject: "Physics".to_string(),
        topic: "Newton’s First Law".to_string(),
        students: "30".to_string(),
        duration: "40".to_string(),
        date: "2025-05-25".to_string(),
        teacher: "Najaf Ali Sharqi".to_string(),
    }
}

/// Always returns the same text.
pub struct StubClient {
    text: String,
}

impl StubClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        Ok(self.text.clone())
    }
}

/// Always fails with a 401, the way an unauthenticated client does.
pub struct FailingClient;

impl FailingClient {
    pub const BODY: &str = "invalid api key";
}

#[async_trait]
impl CompletionClient for FailingClient {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: Self::BODY.to_string(),
        })
    }
}

/// Returns canned text and remembers every request it was given.
pub struct RecordingClient {
    text: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for RecordingClient {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.text.clone())
    }
}
