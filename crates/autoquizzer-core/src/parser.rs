//! Quiz reply parser.
//!
//! Turns a free-text model reply into a typed [`Quiz`]: locate the JSON
//! payload, parse it strictly, fall back to [`repair_parse`], then convert.
//! Also hosts [`lint_quiz`] for checking saved or generated quizzes.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::error::GenerationError;
use crate::model::{OptionLetter, Question, Quiz, OPTIONS_PER_QUESTION, QUIZ_LEN};
use crate::repair::repair_parse;

/// Outcome of parsing a model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizParse {
    /// The payload was valid JSON.
    Strict(Quiz),
    /// The payload needed lenient repair.
    Repaired(Quiz),
    /// Neither stage produced a quiz.
    Failed(String),
}

impl QuizParse {
    pub fn into_result(self) -> Result<Quiz, GenerationError> {
        match self {
            QuizParse::Strict(quiz) | QuizParse::Repaired(quiz) => Ok(quiz),
            QuizParse::Failed(reason) => Err(GenerationError::Parse(reason)),
        }
    }

    pub fn is_repaired(&self) -> bool {
        matches!(self, QuizParse::Repaired(_))
    }
}

/// Intermediate structure for the quiz payload.
#[derive(Debug, Deserialize)]
struct RawQuiz {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    right_option: String,
}

/// Slice `reply` from the first opening bracket to the last closing bracket.
///
/// When the reply has an opening bracket but no closing one after it (a reply
/// cut off by the token limit), the slice runs to the end so the repair stage
/// can close the open containers.
pub fn locate_json(reply: &str) -> Option<&str> {
    let start = reply.find(['{', '['])?;
    match reply.rfind(['}', ']']) {
        Some(end) if end > start => Some(&reply[start..=end]),
        _ => Some(&reply[start..]),
    }
}

/// Parse a quiz generation reply.
pub fn parse_quiz_reply(reply: &str) -> QuizParse {
    let Some(payload) = locate_json(reply) else {
        return QuizParse::Failed("reply contains no JSON object or array".into());
    };

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => match quiz_from_value(value) {
            Ok(quiz) => QuizParse::Strict(quiz),
            Err(reason) => QuizParse::Failed(reason),
        },
        Err(strict_err) => {
            tracing::debug!("strict JSON parse failed, attempting repair: {strict_err}");
            match repair_parse(payload) {
                Some(value) => match quiz_from_value(value) {
                    Ok(quiz) => QuizParse::Repaired(quiz),
                    Err(reason) => QuizParse::Failed(format!("{reason} (after repair)")),
                },
                None => QuizParse::Failed(format!("unrecoverable JSON: {strict_err}")),
            }
        }
    }
}

/// Convert a JSON value into a quiz. A list stands for its first element.
fn quiz_from_value(value: Value) -> Result<Quiz, String> {
    let value = match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| "reply is an empty JSON list".to_string())?,
        other => other,
    };

    let raw: RawQuiz =
        serde_json::from_value(value).map_err(|e| format!("unexpected quiz structure: {e}"))?;

    let questions = raw
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            let right_option: OptionLetter = q
                .right_option
                .parse()
                .map_err(|e: String| format!("question {}: {e}", i + 1))?;
            Ok(Question {
                question: q.question,
                options: q.options,
                right_option,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(Quiz {
        topic: raw.topic,
        questions,
    })
}

/// A warning from quiz validation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizWarning {
    /// One-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl QuizWarning {
    fn quiz(message: impl Into<String>) -> Self {
        Self {
            question: None,
            message: message.into(),
        }
    }

    fn question(number: usize, message: impl Into<String>) -> Self {
        Self {
            question: Some(number),
            message: message.into(),
        }
    }
}

/// Check a quiz for common issues.
pub fn lint_quiz(quiz: &Quiz) -> Vec<QuizWarning> {
    let mut warnings = Vec::new();

    if quiz.topic.trim().is_empty() {
        warnings.push(QuizWarning::quiz("topic is empty"));
    }

    if quiz.questions.len() != QUIZ_LEN {
        warnings.push(QuizWarning::quiz(format!(
            "expected {QUIZ_LEN} questions, found {}",
            quiz.questions.len()
        )));
    }

    for (i, q) in quiz.questions.iter().enumerate() {
        let number = i + 1;

        if q.question.trim().is_empty() {
            warnings.push(QuizWarning::question(number, "question text is empty"));
        }

        if q.options.len() != OPTIONS_PER_QUESTION {
            warnings.push(QuizWarning::question(
                number,
                format!(
                    "expected {OPTIONS_PER_QUESTION} options, found {}",
                    q.options.len()
                ),
            ));
        }

        // Labels must match their position.
        for (letter, option) in OptionLetter::ALL.iter().zip(&q.options) {
            let expected = format!("{letter}.");
            if !option.trim_start().to_lowercase().starts_with(&expected) {
                warnings.push(QuizWarning::question(
                    number,
                    format!("option {letter} is not labelled \"{expected}\": {option}"),
                ));
            }
        }

        let mut seen = HashSet::new();
        for option in &q.options {
            if !seen.insert(option_body(option)) {
                warnings.push(QuizWarning::question(
                    number,
                    format!("duplicate option: {option}"),
                ));
            }
        }
    }

    warnings
}

/// Option text without its letter label, lowercased for comparison.
fn option_body(option: &str) -> String {
    let trimmed = option.trim();
    let body = match trimmed.split_once(". ") {
        Some((label, rest)) if label.len() == 1 => rest,
        _ => trimmed,
    };
    body.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    const STRICT_REPLY: &str = r#"{"topic": "Capybaras",
 "questions": [
  {"question": "Q1", "options": ["a. w", "b. x", "c. y", "d. z"], "right_option": "c"},
  {"question": "Q2", "options": ["a. w", "b. x", "c. y", "d. z"], "right_option": "a"},
  {"question": "Q3", "options": ["a. w", "b. x", "c. y", "d. z"], "right_option": "b"},
  {"question": "Q4", "options": ["a. w", "b. x", "c. y", "d. z"], "right_option": "d"},
  {"question": "Q5", "options": ["a. w", "b. x", "c. y", "d. z"], "right_option": "a"}
 ]}"#;

    #[test]
    fn strict_reply_parses() {
        let parsed = parse_quiz_reply(STRICT_REPLY);
        let QuizParse::Strict(quiz) = parsed else {
            panic!("expected strict parse, got {parsed:?}");
        };
        assert_eq!(quiz.topic, "Capybaras");
        assert_eq!(quiz.questions.len(), 5);
        assert_eq!(quiz.questions[0].right_option, OptionLetter::C);
        assert!(quiz.check_shape().is_ok());
    }

    #[test]
    fn prose_wrapped_reply_matches_bare_payload() {
        let wrapped = format!("Sure! Here is your quiz:\n{STRICT_REPLY}\nHope this helps");
        assert_eq!(parse_quiz_reply(&wrapped), parse_quiz_reply(STRICT_REPLY));
    }

    #[test]
    fn markdown_fenced_reply() {
        let fenced = format!("```json\n{STRICT_REPLY}\n```");
        assert!(matches!(parse_quiz_reply(&fenced), QuizParse::Strict(_)));
    }

    #[test]
    fn list_reply_uses_first_element() {
        let listed = format!("[{STRICT_REPLY}, {{\"topic\": \"other\"}}]");
        let quiz = parse_quiz_reply(&listed).into_result().unwrap();
        assert_eq!(quiz.topic, "Capybaras");
    }

    #[test]
    fn broken_reply_is_repaired() {
        let broken = STRICT_REPLY.replace("\"right_option\": \"c\"}", "'right_option': 'C',}");
        let parsed = parse_quiz_reply(&broken);
        assert!(parsed.is_repaired(), "got {parsed:?}");
        let quiz = parsed.into_result().unwrap();
        assert_eq!(quiz.questions[0].right_option, OptionLetter::C);
    }

    #[test]
    fn truncated_reply_is_repaired() {
        let cut = STRICT_REPLY.strip_suffix("\n ]}").unwrap();
        let parsed = parse_quiz_reply(cut);
        assert!(parsed.is_repaired(), "got {parsed:?}");
        assert_eq!(parsed.into_result().unwrap().questions.len(), 5);
    }

    #[test]
    fn reply_without_json_fails() {
        let err = parse_quiz_reply("I cannot help with that.")
            .into_result()
            .unwrap_err();
        assert!(matches!(err, GenerationError::Parse(_)));
    }

    #[test]
    fn unknown_right_option_fails() {
        let bad = STRICT_REPLY.replace("\"right_option\": \"d\"", "\"right_option\": \"e\"");
        let QuizParse::Failed(reason) = parse_quiz_reply(&bad) else {
            panic!("expected failure");
        };
        assert!(reason.contains("question 4"), "{reason}");
    }

    #[test]
    fn empty_list_fails() {
        assert!(matches!(parse_quiz_reply("[]"), QuizParse::Failed(_)));
    }

    #[test]
    fn locate_json_slices_outer_brackets() {
        assert_eq!(locate_json("x {\"a\": [1]} y"), Some("{\"a\": [1]}"));
        assert_eq!(locate_json("x [1, 2] y"), Some("[1, 2]"));
        assert_eq!(locate_json("x {\"a\": 1"), Some("{\"a\": 1"));
        assert_eq!(locate_json("no json"), None);
    }

    #[test]
    fn lint_clean_quiz() {
        assert!(lint_quiz(&fixtures::quiz()).is_empty());
    }

    #[test]
    fn lint_reports_problems() {
        let mut quiz = fixtures::quiz();
        quiz.topic = " ".into();
        quiz.questions[0].question.clear();
        quiz.questions[1].options[2] = "first".into();
        quiz.questions[2].options[0] = "b. second".into();
        quiz.questions[3].options.pop();

        let warnings = lint_quiz(&quiz);
        assert!(warnings.contains(&QuizWarning::quiz("topic is empty")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(1) && w.message.contains("empty")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(2) && w.message.contains("not labelled \"c.\"")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(2) && w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(3) && w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.question == Some(4) && w.message.contains("expected 4 options")));
    }
}
