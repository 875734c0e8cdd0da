//! Tutoring entry points: learn content, quiz questions and follow-up answers.

use crate::ai::gemini::types::{GenerationConfig, ResponseMimeType};
use crate::ai::{GenerateOptions, GenerationService};
use crate::models::{QuizBatch, QuizItem};
use crate::{prompts, quiz, Result};

pub const LEARN_MAX_OUTPUT_TOKENS: u32 = 4096;
pub const QUIZ_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const ASK_MAX_OUTPUT_TOKENS: u32 = 1000;

/// Stateless front to a [`GenerationService`]; every call builds its own
/// request and owns its own response.
pub struct Tutor {
    gateway: Box<dyn GenerationService>,
}

impl Tutor {
    pub fn new(gateway: Box<dyn GenerationService>) -> Self {
        Self { gateway }
    }

    /// Structured explanation of `topic`, as plain text.
    pub async fn fetch_learn_content(&self, subject: &str, topic: &str) -> Result<String> {
        let prompt = prompts::learn_prompt(subject, topic);
        self.gateway
            .generate(
                &prompt,
                &GenerateOptions::with_max_output_tokens(LEARN_MAX_OUTPUT_TOKENS),
            )
            .await
    }

    pub async fn fetch_test_questions(&self, subject: &str, topic: &str) -> Result<Vec<QuizItem>> {
        Ok(self.fetch_test_questions_report(subject, topic).await?.items)
    }

    /// Like [`Tutor::fetch_test_questions`], also reporting dropped items.
    pub async fn fetch_test_questions_report(
        &self,
        subject: &str,
        topic: &str,
    ) -> Result<QuizBatch> {
        let prompt = prompts::quiz_prompt(subject, topic);
        let options = GenerateOptions::with_max_output_tokens(QUIZ_MAX_OUTPUT_TOKENS)
            .generation_config(GenerationConfig {
                response_mime_type: Some(ResponseMimeType::Json),
                response_schema: Some(quiz::response_schema()),
                ..Default::default()
            });

        let raw = self.gateway.generate(&prompt, &options).await?;
        quiz::parse_quiz(&raw)
    }

    pub async fn ask_question(&self, subject: &str, topic: &str, question: &str) -> Result<String> {
        let prompt = prompts::ask_prompt(subject, topic, question);
        self.gateway
            .generate(
                &prompt,
                &GenerateOptions::with_max_output_tokens(ASK_MAX_OUTPUT_TOKENS),
            )
            .await
    }
}
