//! Built-in subject and topic catalogue.

use crate::Result;
use serde::Deserialize;

const BUILTIN: &str = include_str!("../data/subjects.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Subject {
    pub name: String,
    pub topics: Vec<String>,
}

/// Ordered list of subjects, each with its topics.
#[derive(Debug, Clone)]
pub struct Catalogue {
    subjects: Vec<Subject>,
}

impl Catalogue {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN)
    }

    /// Read a catalogue from a JSON list of `{ "name", "topics" }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let subjects: Vec<Subject> = serde_json::from_str(json)?;
        Ok(Self { subjects })
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn topics(&self, subject: &str) -> Option<&[String]> {
        self.subjects
            .iter()
            .find(|s| s.name == subject)
            .map(|s| s.topics.as_slice())
    }

    pub fn contains(&self, subject: &str, topic: &str) -> bool {
        self.topics(subject)
            .is_some_and(|topics| topics.iter().any(|t| t == topic))
    }
}
