use super::gemini::types::FinishReason;
use super::{GenerateOptions, GenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted outcome for one mocked `generate` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    RequestFailed(u16),
    EmptyGeneration(FinishReason),
}

/// A prompt and the options it was sent with.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub options: GenerateOptions,
}

/// In-memory [`GenerationService`] that cycles through scripted replies.
///
/// Clones share state, so a test can keep one handle after boxing another.
#[derive(Clone)]
pub struct MockGenerationClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_reply(MockReply::Text(text.into()))
    }

    pub fn with_reply(self, reply: MockReply) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                options: options.clone(),
            });
            calls.len()
        };

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            // Echo the prompt when nothing was scripted
            return Ok(format!("Mock answer for: {}", prompt.trim()));
        }

        match &replies[(count - 1) % replies.len()] {
            MockReply::Text(text) => Ok(text.trim().to_string()),
            MockReply::RequestFailed(status) => Err(Error::RequestFailed {
                status: Some(*status),
                message: "mock failure".to_string(),
            }),
            MockReply::EmptyGeneration(finish_reason) => Err(Error::EmptyGeneration {
                finish_reason: finish_reason.clone(),
                safety_ratings: Vec::new(),
                block_reason: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_echoes_prompt() {
        let client = MockGenerationClient::new();
        let text = client
            .generate("explain queues", &GenerateOptions::default())
            .await
            .unwrap();
        assert!(text.contains("explain queues"));
    }

    #[tokio::test]
    async fn test_mock_cycles_replies() {
        let client = MockGenerationClient::new()
            .with_text("first")
            .with_reply(MockReply::RequestFailed(500));

        let options = GenerateOptions::default();
        assert_eq!(client.generate("a", &options).await.unwrap(), "first");
        assert_eq!(
            client.generate("b", &options).await.unwrap_err().status(),
            Some(500)
        );
        // Should cycle back
        assert_eq!(client.generate("c", &options).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_mock_records_calls() {
        let client = MockGenerationClient::new();
        let handle = client.clone();

        assert_eq!(handle.get_call_count(), 0);
        client
            .generate("p", &GenerateOptions::with_max_output_tokens(10))
            .await
            .unwrap();

        let calls = handle.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "p");
        assert_eq!(calls[0].options.max_output_tokens, Some(10));
    }
}
