//! The `CompletionClient` trait.

use async_trait::async_trait;

use super::types::{CompletionError, CompletionRequest};

/// Sends one prompt to a hosted model and returns the generated text.
///
/// Implementations perform a single request with no retry and no
/// streaming. The trait is object-safe so the planner can hold an
/// `Arc<dyn CompletionClient>`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short name used in log lines (e.g. "chat-completions").
    fn name(&self) -> &str;

    /// Run the completion and return the first choice's message content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn CompletionClient) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    #[async_trait]
    impl CompletionClient for EchoClient {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            Ok(request.prompt.clone())
        }
    }

    #[tokio::test]
    async fn client_is_usable_as_trait_object() {
        let client: Box<dyn CompletionClient> = Box::new(EchoClient);
        assert_eq!(client.name(), "echo");

        let request = CompletionRequest {
            model: "m".to_string(),
            prompt: "hello".to_string(),
            temperature: 0.0,
        };
        assert_eq!(client.complete(&request).await.unwrap(), "hello");
    }
}
