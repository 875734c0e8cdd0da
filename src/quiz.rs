//! Quiz response validation and quiz attempts
//!
//! The model is asked for JSON matching [`response_schema`], but its output
//! is still checked item by item. Items that do not match the expected shape
//! are dropped; the rest of the batch is kept.

use crate::models::{OptionLabel, QuizBatch, QuizItem};
use crate::{Error, Result};
use serde_json::{json, Value};

/// Structured-output schema sent with the quiz request.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "description": "A list of 5 multiple-choice questions.",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING", "description": "The question text." },
                "options": {
                    "type": "ARRAY",
                    "description": "An array of exactly 4 possible answer strings.",
                    "items": { "type": "STRING" }
                },
                "correct": {
                    "type": "STRING",
                    "description": "The letter of the correct option (e.g., 'A', 'B', 'C', 'D')."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "A detailed explanation for the correct answer."
                }
            },
            "required": ["question", "options", "correct", "explanation"]
        }
    })
}

/// Parse raw model output into validated quiz items.
///
/// Fails only when the text is not JSON, is not an array, or contains no
/// valid item at all.
pub fn parse_quiz(raw: &str) -> Result<QuizBatch> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| {
        tracing::error!("Failed to parse AI JSON response: {}\nBody: {}", e, raw);
        Error::MalformedResponse {
            raw: raw.to_string(),
            reason: format!("invalid JSON: {}", e),
        }
    })?;

    let Value::Array(entries) = parsed else {
        tracing::error!("AI response was not an array of questions: {}", raw);
        return Err(Error::UnexpectedShape {
            raw: raw.to_string(),
        });
    };

    let total = entries.len();
    let items: Vec<QuizItem> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let item = validate_item(entry);
            if item.is_none() {
                tracing::debug!(index, "Dropping malformed quiz item: {}", entry);
            }
            item
        })
        .collect();
    let dropped = total - items.len();

    if items.is_empty() {
        return Err(Error::NoValidQuestions { dropped });
    }
    if dropped > 0 {
        tracing::warn!("Dropped {} of {} quiz items", dropped, total);
    }

    Ok(QuizBatch { items, dropped })
}

fn validate_item(entry: &Value) -> Option<QuizItem> {
    let object = entry.as_object()?;
    let question = object.get("question")?.as_str()?;
    let explanation = object.get("explanation")?.as_str()?;
    let correct: OptionLabel = object.get("correct")?.as_str()?.parse().ok()?;

    let raw_options = object.get("options")?.as_array()?;
    if raw_options.len() != 4 {
        return None;
    }
    let mut options: [String; 4] = Default::default();
    for (label, (slot, value)) in OptionLabel::ALL
        .iter()
        .zip(options.iter_mut().zip(raw_options))
    {
        *slot = label_option(*label, value.as_str()?);
    }

    Some(QuizItem {
        question: question.to_string(),
        options,
        correct,
        explanation: explanation.to_string(),
    })
}

/// Prefix `option` with its positional label unless it already has it.
fn label_option(label: OptionLabel, option: &str) -> String {
    let prefix = label.prefix();
    if option.starts_with(&prefix) {
        option.to_string()
    } else {
        format!("{}{}", prefix, option)
    }
}

/// Score band shown at the end of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Excellent,
    Passing,
    NeedsReview,
}

impl Grade {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 80 {
            Grade::Excellent
        } else if percent >= 60 {
            Grade::Passing
        } else {
            Grade::NeedsReview
        }
    }
}

/// One pass through a quiz: the learner's answers and the resulting score.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    items: Vec<QuizItem>,
    answers: Vec<Option<OptionLabel>>,
}

impl QuizAttempt {
    pub fn new(items: Vec<QuizItem>) -> Self {
        let answers = vec![None; items.len()];
        Self { items, answers }
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Record (or change) the answer to question `index`.
    pub fn select(&mut self, index: usize, label: OptionLabel) -> Result<()> {
        let slot = self.answers.get_mut(index).ok_or_else(|| {
            Error::InvalidInput(format!("question {} is out of range", index + 1))
        })?;
        *slot = Some(label);
        Ok(())
    }

    pub fn answer(&self, index: usize) -> Option<OptionLabel> {
        self.answers.get(index).copied().flatten()
    }

    /// `None` until the question has been answered.
    pub fn is_correct(&self, index: usize) -> Option<bool> {
        let answer = self.answer(index)?;
        Some(self.items[index].correct == answer)
    }

    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    pub fn correct_count(&self) -> usize {
        (0..self.items.len())
            .filter(|&i| self.is_correct(i) == Some(true))
            .count()
    }

    /// Percentage of correct answers, rounded to the nearest integer.
    pub fn score_percent(&self) -> u32 {
        if self.items.is_empty() {
            return 0;
        }
        let ratio = self.correct_count() as f64 / self.items.len() as f64;
        (ratio * 100.0).round() as u32
    }

    pub fn grade(&self) -> Grade {
        Grade::from_percent(self.score_percent())
    }

    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(|a| *a = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labeled(options: [&str; 4]) -> [String; 4] {
        options.map(str::to_string)
    }

    #[test]
    fn test_malformed_item_dropped_rest_kept() {
        let raw = r#"[
            {"question": "Q1", "options": ["a", "b", "c", "d"], "correct": "A", "explanation": "e"},
            {"malformed": true}
        ]"#;

        let batch = parse_quiz(raw).unwrap();
        assert_eq!(batch.dropped, 1);
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.items[0].question, "Q1");
        assert_eq!(
            batch.items[0].options,
            labeled(["A) a", "B) b", "C) c", "D) d"])
        );
        assert_eq!(batch.items[0].correct, OptionLabel::A);
        assert_eq!(batch.items[0].explanation, "e");
    }

    #[test]
    fn test_already_labeled_options_unchanged() {
        let raw = r#"[{"question": "Q", "options": ["A) a", "B) b", "C) c", "D) d"], "correct": "D", "explanation": "e"}]"#;

        let batch = parse_quiz(raw).unwrap();
        assert_eq!(
            batch.items[0].options,
            labeled(["A) a", "B) b", "C) c", "D) d"])
        );
        assert_eq!(batch.dropped, 0);
    }

    #[test]
    fn test_mislabeled_options_get_positional_prefix() {
        let raw = r#"[{"question": "Q", "options": ["B) a", "A)b", "C) c", "x"], "correct": "C", "explanation": "e"}]"#;

        let batch = parse_quiz(raw).unwrap();
        assert_eq!(
            batch.items[0].options,
            labeled(["A) B) a", "B) A)b", "C) c", "D) x"])
        );
    }

    #[test]
    fn test_not_json_is_malformed_response() {
        let err = parse_quiz("not json").unwrap_err();
        match err {
            Error::MalformedResponse { raw, .. } => assert_eq!(raw, "not json"),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_object_top_level_is_unexpected_shape() {
        let err = parse_quiz(r#"{"questions": []}"#).unwrap_err();
        assert!(matches!(err, Error::UnexpectedShape { .. }));
    }

    #[test]
    fn test_empty_array_has_no_valid_questions() {
        let err = parse_quiz("[]").unwrap_err();
        assert!(matches!(err, Error::NoValidQuestions { dropped: 0 }));
    }

    #[test]
    fn test_all_invalid_items_have_no_valid_questions() {
        let raw = r#"[
            null,
            "question",
            {"question": "Q", "options": ["a", "b", "c"], "correct": "A", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", "d", "e"], "correct": "A", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", 4], "correct": "A", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", "d"], "correct": "E", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", "d"], "correct": "a", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", "d"], "correct": 1, "explanation": "e"},
            {"question": 7, "options": ["a", "b", "c", "d"], "correct": "A", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", "d"], "correct": "A"},
            {"question": "Q", "options": "abcd", "correct": "A", "explanation": "e"},
            {"question": "Q", "options": ["a", "b", "c", "d"], "explanation": "e"}
        ]"#;

        let err = parse_quiz(raw).unwrap_err();
        assert!(matches!(err, Error::NoValidQuestions { dropped: 12 }));
    }

    #[test]
    fn test_source_order_preserved() {
        let raw = r#"[
            {"question": "first", "options": ["a", "b", "c", "d"], "correct": "A", "explanation": "e"},
            {"bad": 1},
            {"question": "second", "options": ["a", "b", "c", "d"], "correct": "B", "explanation": "e"},
            {"question": "third", "options": ["a", "b", "c", "d"], "correct": "C", "explanation": "e"}
        ]"#;

        let batch = parse_quiz(raw).unwrap();
        let questions: Vec<&str> = batch.items.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "second", "third"]);
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        assert_eq!(schema["type"], "ARRAY");
        assert_eq!(
            schema["items"]["required"],
            json!(["question", "options", "correct", "explanation"])
        );
    }

    fn sample_items() -> Vec<QuizItem> {
        OptionLabel::ALL
            .iter()
            .chain([OptionLabel::A].iter())
            .map(|correct| QuizItem {
                question: "Q".to_string(),
                options: labeled(["A) a", "B) b", "C) c", "D) d"]),
                correct: *correct,
                explanation: "e".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_attempt_scoring() {
        let mut attempt = QuizAttempt::new(sample_items());
        assert_eq!(attempt.len(), 5);
        assert!(!attempt.is_complete());
        assert_eq!(attempt.is_correct(0), None);

        attempt.select(0, OptionLabel::A).unwrap();
        attempt.select(1, OptionLabel::B).unwrap();
        attempt.select(2, OptionLabel::C).unwrap();
        attempt.select(3, OptionLabel::A).unwrap();
        attempt.select(4, OptionLabel::B).unwrap();

        assert!(attempt.is_complete());
        assert_eq!(attempt.is_correct(3), Some(false));
        assert_eq!(attempt.correct_count(), 3);
        assert_eq!(attempt.score_percent(), 60);
        assert_eq!(attempt.grade(), Grade::Passing);

        attempt.select(3, OptionLabel::D).unwrap();
        assert_eq!(attempt.score_percent(), 80);
        assert_eq!(attempt.grade(), Grade::Excellent);

        attempt.reset();
        assert_eq!(attempt.correct_count(), 0);
        assert_eq!(attempt.grade(), Grade::NeedsReview);
    }

    #[test]
    fn test_attempt_rounds_percentages() {
        let mut attempt = QuizAttempt::new(sample_items().into_iter().take(3).collect());
        attempt.select(0, OptionLabel::A).unwrap();
        assert_eq!(attempt.score_percent(), 33);
        attempt.select(1, OptionLabel::B).unwrap();
        assert_eq!(attempt.score_percent(), 67);
    }

    #[test]
    fn test_attempt_rejects_out_of_range_question() {
        let mut attempt = QuizAttempt::new(sample_items());
        assert!(matches!(
            attempt.select(5, OptionLabel::A),
            Err(Error::InvalidInput(_))
        ));
    }
}
