//! Core data model types for autoquizzer.
//!
//! A quiz is produced once per URL submission and is immutable afterwards.
//! The shape invariant (5 questions, 4 options each) is enforced by the
//! pipeline via [`Quiz::check_shape`], not by the serde schema.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Number of questions in a generated quiz.
pub const QUIZ_LEN: usize = 5;

/// Number of options per question.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A choice letter in `{a, b, c, d}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    /// All letters, in option order.
    pub const ALL: [OptionLetter; OPTIONS_PER_QUESTION] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    /// Zero-based option index.
    pub fn index(self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Exact match on a lowercase letter. `'A'` is not a letter.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(OptionLetter::A),
            'b' => Some(OptionLetter::B),
            'c' => Some(OptionLetter::C),
            'd' => Some(OptionLetter::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OptionLetter::A => 'a',
            OptionLetter::B => 'b',
            OptionLetter::C => 'c',
            OptionLetter::D => 'd',
        }
    }

    /// The `"a. "` prefix an option label is expected to carry.
    pub fn label_prefix(self) -> String {
        format!("{}. ", self.as_char())
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = String;

    /// Accepts the answer-key spellings models produce: `"c"`, `"C"`, `" c. "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_end_matches(['.', ')']).to_lowercase();
        let mut chars = normalized.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                OptionLetter::from_char(c).ok_or_else(|| format!("unknown option letter: {s}"))
            }
            _ => Err(format!("unknown option letter: {s}")),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question text, understandable in isolation.
    pub question: String,
    /// Option labels, each prefixed with its own letter (`"a. ..."`).
    pub options: Vec<String>,
    /// Letter of the right option.
    pub right_option: OptionLetter,
}

impl Question {
    /// Text of the option at `letter`, if the question has that many options.
    pub fn option_text(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(letter.index()).map(String::as_str)
    }

    /// Text of the right option.
    pub fn right_option_text(&self) -> &str {
        self.option_text(self.right_option).unwrap_or_default()
    }
}

/// A generated quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// One sentence describing the topic of the source text.
    pub topic: String,
    /// The questions, in presentation order.
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Enforce the post-generation shape: `QUIZ_LEN` questions with
    /// `OPTIONS_PER_QUESTION` options each.
    pub fn check_shape(&self) -> Result<(), GenerationError> {
        if self.questions.len() != QUIZ_LEN {
            return Err(GenerationError::InvalidQuiz(format!(
                "expected {QUIZ_LEN} questions, got {}",
                self.questions.len()
            )));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(GenerationError::InvalidQuiz(format!(
                    "question {} has {} options, expected {OPTIONS_PER_QUESTION}",
                    i + 1,
                    q.options.len()
                )));
            }
        }
        Ok(())
    }

    /// Save the quiz as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize quiz")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write quiz to {}", path.display()))?;
        Ok(())
    }

    /// Load a quiz saved by [`Quiz::save_json`].
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read quiz from {}", path.display()))?;
        let quiz: Quiz = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse quiz JSON: {}", path.display()))?;
        Ok(quiz)
    }
}

/// Where a model answer letter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// The reply started with a valid letter.
    Model,
    /// The reply was outside the alphabet; a random letter was substituted.
    Fallback,
}

/// A model's answer to one question, already normalized to a letter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAnswer {
    pub letter: OptionLetter,
    pub source: AnswerSource,
    /// The raw model reply, kept for audit.
    #[serde(default)]
    pub reply: String,
}

impl ModelAnswer {
    pub fn is_fallback(&self) -> bool {
        self.source == AnswerSource::Fallback
    }
}

/// A web search excerpt used as context for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Snippet {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            link: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn question(text: &str, right: OptionLetter) -> Question {
        Question {
            question: text.to_string(),
            options: vec![
                "a. first".into(),
                "b. second".into(),
                "c. third".into(),
                "d. fourth".into(),
            ],
            right_option: right,
        }
    }

    /// A valid quiz whose answer key is `a b c d a`.
    pub fn quiz() -> Quiz {
        Quiz {
            topic: "Capybaras, the largest living rodents".into(),
            questions: vec![
                question("Where do capybaras live?", OptionLetter::A),
                question("What do capybaras eat?", OptionLetter::B),
                question("How large is a capybara group?", OptionLetter::C),
                question("Which animal preys on capybaras?", OptionLetter::D),
                question("How long do capybaras live?", OptionLetter::A),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_display_and_parse() {
        assert_eq!(OptionLetter::C.to_string(), "c");
        assert_eq!("c".parse::<OptionLetter>().unwrap(), OptionLetter::C);
        assert_eq!("B".parse::<OptionLetter>().unwrap(), OptionLetter::B);
        assert_eq!(" d. ".parse::<OptionLetter>().unwrap(), OptionLetter::D);
        assert!("e".parse::<OptionLetter>().is_err());
        assert!("ab".parse::<OptionLetter>().is_err());
        assert!("".parse::<OptionLetter>().is_err());
    }

    #[test]
    fn letter_from_char_is_exact() {
        assert_eq!(OptionLetter::from_char('a'), Some(OptionLetter::A));
        assert_eq!(OptionLetter::from_char('A'), None);
        assert_eq!(OptionLetter::from_char('e'), None);
    }

    #[test]
    fn letter_index_roundtrip() {
        for letter in OptionLetter::ALL {
            assert_eq!(OptionLetter::from_index(letter.index()), Some(letter));
        }
        assert_eq!(OptionLetter::from_index(4), None);
    }

    #[test]
    fn right_option_serializes_lowercase() {
        let q = fixtures::question("q", OptionLetter::C);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["right_option"], "c");
        assert_eq!(q.right_option_text(), "c. third");
    }

    #[test]
    fn check_shape_accepts_valid_quiz() {
        assert!(fixtures::quiz().check_shape().is_ok());
    }

    #[test]
    fn check_shape_rejects_wrong_counts() {
        let mut quiz = fixtures::quiz();
        quiz.questions.pop();
        let err = quiz.check_shape().unwrap_err();
        assert!(err.to_string().contains("expected 5 questions"));

        let mut quiz = fixtures::quiz();
        quiz.questions[2].options.truncate(3);
        let err = quiz.check_shape().unwrap_err();
        assert!(err.to_string().contains("question 3 has 3 options"));
    }

    #[test]
    fn quiz_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quiz.json");
        let quiz = fixtures::quiz();
        quiz.save_json(&path).unwrap();
        assert_eq!(Quiz::load_json(&path).unwrap(), quiz);
    }
}
