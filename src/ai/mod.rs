//! Model gateway: one prompt in, one generated text out.
//!
//! [`GenerationService`] is the seam between the tutoring logic and the
//! remote model. [`GeminiClient`] talks to the real endpoint and
//! [`MockGenerationClient`] replays scripted replies for tests.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::{MockGenerationClient, MockReply};

use crate::Result;
use async_trait::async_trait;
use gemini::types::GenerationConfig;

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.95;
pub const DEFAULT_TOP_K: u32 = 40;

/// Per-call options; anything left unset falls back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub max_output_tokens: Option<u32>,
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateOptions {
    pub fn with_max_output_tokens(max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens: Some(max_output_tokens),
            generation_config: None,
        }
    }

    pub fn generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    /// Final generation settings: defaults, then the token limit, then the
    /// override merged on top.
    pub fn resolve(&self) -> GenerationConfig {
        let defaults = GenerationConfig {
            max_output_tokens: Some(self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS)),
            temperature: Some(DEFAULT_TEMPERATURE),
            top_p: Some(DEFAULT_TOP_P),
            top_k: Some(DEFAULT_TOP_K),
            response_mime_type: None,
            response_schema: None,
        };

        match &self.generation_config {
            Some(overrides) => defaults.merge(overrides.clone()),
            None => defaults,
        }
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Perform a single request/response exchange and return the trimmed text.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::gemini::types::ResponseMimeType;
    use super::*;

    #[test]
    fn test_resolve_uses_defaults() {
        let config = GenerateOptions::default().resolve();
        assert_eq!(config.max_output_tokens, Some(2048));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.top_p, Some(0.95));
        assert_eq!(config.top_k, Some(40));
        assert!(config.response_mime_type.is_none());
    }

    #[test]
    fn test_resolve_applies_token_limit_and_override() {
        let config = GenerateOptions::with_max_output_tokens(8192)
            .generation_config(GenerationConfig {
                response_mime_type: Some(ResponseMimeType::Json),
                top_k: Some(10),
                ..Default::default()
            })
            .resolve();

        assert_eq!(config.max_output_tokens, Some(8192));
        assert_eq!(config.top_k, Some(10));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.response_mime_type, Some(ResponseMimeType::Json));
    }

    #[test]
    fn test_override_token_limit_beats_option() {
        let config = GenerateOptions::with_max_output_tokens(4096)
            .generation_config(GenerationConfig {
                max_output_tokens: Some(16),
                ..Default::default()
            })
            .resolve();
        assert_eq!(config.max_output_tokens, Some(16));
    }
}
