//! LearnBot - a model-backed computer science tutor
//!
//! Builds prompts for explanations, quizzes and follow-up questions, sends
//! them to Gemini, and validates the quiz JSON that comes back. A headless
//! [`session::StudySession`] holds the learner-facing state.

pub mod ai;
pub mod error;
pub mod models;
pub mod prompts;
pub mod quiz;
pub mod session;
pub mod subjects;
pub mod tutor;

pub use error::{Error, Result};
