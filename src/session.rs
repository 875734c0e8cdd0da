//! Study session orchestration: selection, mode, learn content, quiz and chat.
//!
//! This is the only layer that turns tutoring errors into user-facing
//! defaults. Everything below it propagates failures unchanged.

use crate::models::{ChatTurn, Mode, QuizItem, Role};
use crate::quiz::QuizAttempt;
use crate::tutor::Tutor;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

/// Holds everything a learner sees for the current subject and topic.
pub struct StudySession {
    id: Uuid,
    tutor: Tutor,
    subject: Option<String>,
    topic: Option<String>,
    mode: Mode,
    learn_content: String,
    quiz: Vec<QuizItem>,
    chat: Vec<ChatTurn>,
    next_turn_id: u64,
    last_error: Option<String>,
}

impl StudySession {
    pub fn new(tutor: Tutor) -> Self {
        Self {
            id: Uuid::new_v4(),
            tutor,
            subject: None,
            topic: None,
            mode: Mode::default(),
            learn_content: String::new(),
            quiz: Vec::new(),
            chat: Vec::new(),
            next_turn_id: 0,
            last_error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn learn_content(&self) -> &str {
        &self.learn_content
    }

    pub fn quiz(&self) -> &[QuizItem] {
        &self.quiz
    }

    pub fn chat(&self) -> &[ChatTurn] {
        &self.chat
    }

    /// Message of the most recent failed load or chat request.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn selection(&self) -> Option<(String, String)> {
        Some((self.subject.clone()?, self.topic.clone()?))
    }

    /// Change the selected subject and topic. The chat log always starts
    /// over; without a full selection all mode state is cleared too.
    pub fn select(&mut self, subject: Option<String>, topic: Option<String>) {
        info!(session = %self.id, subject = ?subject, topic = ?topic, "Selection changed");
        self.subject = subject;
        self.topic = topic;
        self.chat.clear();

        if self.selection().is_none() {
            self.learn_content.clear();
            self.quiz.clear();
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Fetch content for the current selection and mode, replacing what was
    /// loaded before. Does nothing without a full selection.
    pub async fn load_content(&mut self) {
        let Some((subject, topic)) = self.selection() else {
            return;
        };

        self.learn_content.clear();
        self.quiz.clear();
        self.last_error = None;

        let span = info_span!("load_content", session = %self.id, mode = ?self.mode);
        match self.mode {
            Mode::Learn => {
                let result = self
                    .tutor
                    .fetch_learn_content(&subject, &topic)
                    .instrument(span.clone())
                    .await;
                let _entered = span.enter();
                match result {
                    Ok(content) => self.learn_content = content,
                    Err(e) => {
                        error!("Error loading content: {}", e);
                        self.learn_content =
                            format!("Failed to load content: {}. Please try again.", e);
                        self.last_error = Some(e.to_string());
                    }
                }
            }
            Mode::Test => {
                let result = self
                    .tutor
                    .fetch_test_questions_report(&subject, &topic)
                    .instrument(span.clone())
                    .await;
                let _entered = span.enter();
                match result {
                    Ok(batch) => {
                        info!(
                            "Loaded {} quiz questions ({} dropped)",
                            batch.items.len(),
                            batch.dropped
                        );
                        self.quiz = batch.items;
                    }
                    Err(e) => {
                        error!("Error loading quiz: {}", e);
                        self.last_error = Some(e.to_string());
                    }
                }
            }
        }
    }

    /// Send a chat message about the current topic.
    ///
    /// The user turn is appended before the request goes out; the reply (or
    /// a fixed fallback) follows once it settles. Returns the assistant turn,
    /// or `None` without a full selection.
    pub async fn send_message(&mut self, message: &str) -> Option<&ChatTurn> {
        let (subject, topic) = self.selection()?;

        let user_id = self.next_turn_id;
        self.next_turn_id += 2;
        self.chat
            .push(ChatTurn::new(user_id, Role::User, message.to_string()));

        let span = info_span!("send_message", session = %self.id, turn = user_id);
        let result = self
            .tutor
            .ask_question(&subject, &topic, message)
            .instrument(span.clone())
            .await;
        let content = match result {
            Ok(answer) => answer,
            Err(e) => {
                let _entered = span.enter();
                error!("Error getting answer: {}", e);
                self.last_error = Some(e.to_string());
                CHAT_FALLBACK.to_string()
            }
        };

        self.chat
            .push(ChatTurn::new(user_id + 1, Role::Assistant, content));
        self.chat.last()
    }

    /// Start answering the loaded quiz.
    pub fn start_quiz(&self) -> QuizAttempt {
        QuizAttempt::new(self.quiz.clone())
    }
}
