//! Data models and configuration
//!
//! Quiz items, chat turns, study modes and the environment-sourced
//! configuration of the model gateway.

use crate::ai::gemini::client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Label of one of the four quiz options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }

    /// Positional prefix used on rendered options, e.g. `"A) "`.
    pub fn prefix(&self) -> String {
        format!("{}) ", self.as_str())
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = crate::Error;

    /// Strict: only the exact uppercase letters are accepted.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            other => Err(crate::Error::InvalidInput(format!(
                "'{}' is not one of A, B, C, D",
                other
            ))),
        }
    }
}

/// A validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    /// Always labeled `"A) "`..`"D) "` once validated.
    pub options: [String; 4],
    pub correct: OptionLabel,
    pub explanation: String,
}

impl QuizItem {
    pub fn option(&self, label: OptionLabel) -> &str {
        &self.options[label.index()]
    }

    pub fn correct_option(&self) -> &str {
        self.option(self.correct)
    }
}

/// Validated quiz plus how many source items were discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizBatch {
    pub items: Vec<QuizItem>,
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(id: u64, role: Role, content: String) -> Self {
        Self {
            id,
            role,
            content,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Learn,
    Test,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; requests will be rejected by the API");
        }

        let request_timeout = match lookup("LEARNBOT_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    crate::Error::Config(format!(
                        "LEARNBOT_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_option_label_round_trip_index() {
        for (i, label) in OptionLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(OptionLabel::from_index(i), Some(*label));
        }
        assert_eq!(OptionLabel::from_index(4), None);
        assert_eq!(OptionLabel::C.prefix(), "C) ");
    }

    #[test]
    fn test_option_label_parse_is_strict() {
        assert_eq!("B".parse::<OptionLabel>().unwrap(), OptionLabel::B);
        assert!("b".parse::<OptionLabel>().is_err());
        assert!("E".parse::<OptionLabel>().is_err());
        assert!(" A".parse::<OptionLabel>().is_err());
    }

    #[test]
    fn test_quiz_item_serialization() {
        let item = QuizItem {
            question: "Q".to_string(),
            options: [
                "A) a".to_string(),
                "B) b".to_string(),
                "C) c".to_string(),
                "D) d".to_string(),
            ],
            correct: OptionLabel::B,
            explanation: "e".to_string(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["correct"], "B");
        assert_eq!(json["options"][3], "D) d");
        assert_eq!(item.correct_option(), "B) b");
    }

    #[test]
    fn test_chat_turn_role_serialization() {
        let turn = ChatTurn::new(0, Role::Assistant, "hi".to_string());
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_key, "");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_config_reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_BASE_URL", "http://localhost:9999"),
            ("LEARNBOT_REQUEST_TIMEOUT_SECS", "45"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[("LEARNBOT_REQUEST_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
