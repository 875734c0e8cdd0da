use super::types::{safety_settings, Content, GenerateContentRequest, GenerateContentResponse};
use crate::ai::{GenerateOptions, GenerationService};
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Gemini REST client for `generateContent`.
///
/// One call is one POST; nothing is retried and no state is kept between
/// calls apart from the pooled `reqwest::Client`.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`),
    /// a `models/`-prefixed value is accepted and stripped.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_key.clone(), config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.request_timeout)
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn post(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        tracing::debug!(
            model = %self.model,
            max_output_tokens = ?request.generation_config.max_output_tokens,
            "Sending generateContent request to Gemini"
        );

        let mut builder = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            Error::RequestFailed {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::RequestFailed {
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            return Err(Error::RequestFailed {
                status: Some(status.as_u16()),
                message: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or(body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::MalformedResponse {
                reason: format!("Failed to parse Gemini response: {}", e),
                raw: body,
            }
        })
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: options.resolve(),
            safety_settings: safety_settings(),
        };

        let response = self.post(&request).await?;
        let block_reason = response.prompt_feedback.and_then(|f| f.block_reason);
        let candidate = response.candidates.into_iter().next();

        if let Some(text) = candidate.as_ref().and_then(|c| c.first_text()) {
            return Ok(text.trim().to_string());
        }

        let (finish_reason, safety_ratings) = candidate
            .map(|c| (c.finish_reason.unwrap_or_default(), c.safety_ratings))
            .unwrap_or_default();
        tracing::error!(
            %finish_reason,
            safety_ratings = ?safety_ratings,
            block_reason = ?block_reason,
            "Gemini API returned no content"
        );

        Err(Error::EmptyGeneration {
            finish_reason,
            safety_ratings,
            block_reason,
        })
    }
}
