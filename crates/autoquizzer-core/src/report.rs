//! Session report types with JSON persistence and mode comparison.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ModelAnswer, Quiz, Snippet};
use crate::scoring::{score_model_answers, ScoreResult};
use crate::traits::TokenUsage;

/// How the model was allowed to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Parametric knowledge only.
    ClosedBook,
    /// Web search snippets injected into the prompt.
    WebRag,
}

impl AnswerMode {
    pub fn label(self) -> &'static str {
        match self {
            AnswerMode::ClosedBook => "Closed book",
            AnswerMode::WebRag => "Web RAG",
        }
    }
}

impl fmt::Display for AnswerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerMode::ClosedBook => write!(f, "closed-book"),
            AnswerMode::WebRag => write!(f, "web-rag"),
        }
    }
}

/// One answering pass over a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeRun {
    pub mode: AnswerMode,
    /// One answer per question, in quiz order.
    pub answers: Vec<ModelAnswer>,
    /// Snippets used per question. Empty for closed-book runs.
    #[serde(default)]
    pub snippets: Vec<Vec<Snippet>>,
    pub score: ScoreResult,
    /// Wall-clock duration of the pass.
    pub duration_ms: u64,
    #[serde(default)]
    pub token_usage: TokenUsage,
}

/// Per-question review row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question: String,
    /// Option text the model picked (the bare letter if the question lacks it).
    pub model_answer: String,
    pub correct_answer: String,
    pub correct: bool,
    /// The model's reply was replaced by a random letter.
    pub fallback: bool,
    pub snippets: Vec<Snippet>,
}

impl ModeRun {
    /// Score `answers` against `quiz` and wrap them up.
    pub fn new(
        quiz: &Quiz,
        mode: AnswerMode,
        answers: Vec<ModelAnswer>,
        snippets: Vec<Vec<Snippet>>,
        duration_ms: u64,
    ) -> Self {
        let score = score_model_answers(quiz, &answers);
        Self {
            mode,
            answers,
            snippets,
            score,
            duration_ms,
            token_usage: TokenUsage::default(),
        }
    }

    /// Answers that came from the random fallback.
    pub fn fallback_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_fallback()).count()
    }

    /// Review rows pairing each question with the model's pick.
    pub fn details(&self, quiz: &Quiz) -> Vec<QuestionDetail> {
        quiz.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(i, (question, answer))| QuestionDetail {
                question: question.question.clone(),
                model_answer: question
                    .option_text(answer.letter)
                    .map(str::to_string)
                    .unwrap_or_else(|| answer.letter.to_string()),
                correct_answer: question.right_option_text().to_string(),
                correct: answer.letter == question.right_option,
                fallback: answer.is_fallback(),
                snippets: self.snippets.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

/// A complete session: one quiz and the scores collected for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Source URL of the quiz.
    pub url: String,
    /// Model that generated and answered the quiz.
    pub model: String,
    pub quiz: Quiz,
    /// Generation attempts used, including the successful one.
    pub generation_attempts: u32,
    /// The user's own score, if they played.
    #[serde(default)]
    pub user: Option<ScoreResult>,
    #[serde(default)]
    pub closed_book: Option<ModeRun>,
    #[serde(default)]
    pub web_rag: Option<ModeRun>,
}

impl SessionReport {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        quiz: Quiz,
        generation_attempts: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            url: url.into(),
            model: model.into(),
            quiz,
            generation_attempts,
            user: None,
            closed_book: None,
            web_rag: None,
        }
    }

    /// Store a mode run in its slot.
    pub fn record(&mut self, run: ModeRun) {
        match run.mode {
            AnswerMode::ClosedBook => self.closed_book = Some(run),
            AnswerMode::WebRag => self.web_rag = Some(run),
        }
    }

    /// The recorded runs, closed book first.
    pub fn runs(&self) -> impl Iterator<Item = &ModeRun> {
        self.closed_book.iter().chain(self.web_rag.iter())
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Per-question agreement between the two modes. `None` unless both ran.
    pub fn compare_modes(&self) -> Option<ModeComparison> {
        let closed = self.closed_book.as_ref()?;
        let rag = self.web_rag.as_ref()?;

        let mut comparison = ModeComparison::default();
        for (c, r) in closed.score.verdicts.iter().zip(&rag.score.verdicts) {
            match (c.correct, r.correct) {
                (true, true) => comparison.both_correct += 1,
                (true, false) => comparison.only_closed_book += 1,
                (false, true) => comparison.only_web_rag += 1,
                (false, false) => comparison.neither += 1,
            }
        }
        Some(comparison)
    }
}

/// Result of comparing closed-book and web-RAG verdicts question by question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeComparison {
    pub both_correct: usize,
    pub only_closed_book: usize,
    pub only_web_rag: usize,
    pub neither: usize,
}

impl ModeComparison {
    /// Questions web RAG fixed minus questions it broke.
    pub fn net_gain(&self) -> i64 {
        self.only_web_rag as i64 - self.only_closed_book as i64
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::run;
    use super::*;
    use crate::model::{fixtures, AnswerSource, OptionLetter::*};

    #[test]
    fn mode_run_scores_answers() {
        let quiz = fixtures::quiz();
        let run = run(&quiz, AnswerMode::ClosedBook, &[A, B, C, D, B]);
        assert_eq!(run.score.correct_count, 4);
        assert_eq!(run.fallback_count(), 0);
    }

    #[test]
    fn details_show_option_text_and_snippets() {
        let quiz = fixtures::quiz();
        let mut answers = test_support::answers(&[B, B, C, D, A]);
        answers[0].source = AnswerSource::Fallback;
        let snippets = vec![vec![Snippet::new("Capybaras live in South America")]];
        let run = ModeRun::new(&quiz, AnswerMode::WebRag, answers, snippets, 5);

        let details = run.details(&quiz);
        assert_eq!(details.len(), 5);
        assert_eq!(details[0].model_answer, "b. second");
        assert_eq!(details[0].correct_answer, "a. first");
        assert!(!details[0].correct);
        assert!(details[0].fallback);
        assert_eq!(details[0].snippets.len(), 1);
        assert!(details[1].snippets.is_empty());
        assert_eq!(run.fallback_count(), 1);
    }

    #[test]
    fn compare_modes_counts_agreement() {
        let quiz = fixtures::quiz();
        let mut report = SessionReport::new("https://example.com", "mock", quiz.clone(), 1);
        assert!(report.compare_modes().is_none());

        report.record(run(&quiz, AnswerMode::ClosedBook, &[A, B, D, A, B]));
        report.record(run(&quiz, AnswerMode::WebRag, &[A, C, C, D, B]));

        let comparison = report.compare_modes().unwrap();
        assert_eq!(
            comparison,
            ModeComparison {
                both_correct: 1,
                only_closed_book: 1,
                only_web_rag: 2,
                neither: 1,
            }
        );
        assert_eq!(comparison.net_gain(), 1);
        assert_eq!(report.runs().count(), 2);
    }

    #[test]
    fn json_roundtrip() {
        let quiz = fixtures::quiz();
        let mut report = SessionReport::new("https://example.com", "mock", quiz.clone(), 2);
        report.record(run(&quiz, AnswerMode::ClosedBook, &[A, B, C, D, A]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        report.save_json(&path).unwrap();
        let loaded = SessionReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.generation_attempts, 2);
        assert_eq!(loaded.closed_book, report.closed_book);
        assert!(loaded.web_rag.is_none());
    }
}
