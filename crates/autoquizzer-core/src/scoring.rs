//! Scoring answers against a quiz's answer key.
//!
//! Two entry points with deliberately different comparison rules:
//! [`score_user_choices`] compares only the first character of a choice label
//! (users pick full `"a. text"` labels), while [`score_model_answers`] compares
//! already-normalized letters. Both are pure.

use serde::{Deserialize, Serialize};

use crate::model::{ModelAnswer, OptionLetter, Question, Quiz};

/// Verdict for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// The question text.
    pub question: String,
    /// What was submitted, if anything.
    pub given: Option<String>,
    pub correct: bool,
    pub right_option: OptionLetter,
    /// Full text of the right option, revealed regardless of correctness.
    pub right_option_text: String,
}

/// Score of one answer set against a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub correct_count: usize,
    /// Number of questions in the quiz.
    pub total: usize,
    /// `correct_count / total`, 0.0 for an empty quiz.
    pub fraction: f64,
    /// One verdict per question, in quiz order.
    pub verdicts: Vec<Verdict>,
}

impl ScoreResult {
    fn from_verdicts(verdicts: Vec<Verdict>) -> Self {
        let total = verdicts.len();
        let correct_count = verdicts.iter().filter(|v| v.correct).count();
        let fraction = if total == 0 {
            0.0
        } else {
            correct_count as f64 / total as f64
        };
        Self {
            correct_count,
            total,
            fraction,
            verdicts,
        }
    }

    /// Score as a display percentage (`fraction * 100`).
    pub fn percentage(&self) -> f64 {
        self.fraction * 100.0
    }
}

fn verdict(question: &Question, given: Option<String>, correct: bool) -> Verdict {
    Verdict {
        question: question.question.clone(),
        given,
        correct,
        right_option: question.right_option,
        right_option_text: question.right_option_text().to_string(),
    }
}

/// Score normalized model answers. Missing answers count as incorrect and
/// answers beyond the quiz length are ignored.
pub fn score_model_answers(quiz: &Quiz, answers: &[ModelAnswer]) -> ScoreResult {
    let verdicts = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| match answers.get(i) {
            Some(answer) => verdict(
                q,
                Some(answer.letter.to_string()),
                answer.letter == q.right_option,
            ),
            None => verdict(q, None, false),
        })
        .collect();
    ScoreResult::from_verdicts(verdicts)
}

/// Score user-submitted choice labels.
///
/// Only the first character of each label is compared with the answer key,
/// so `"c"` and `"c. anything"` both select option c. Missing or empty
/// choices are incorrect.
pub fn score_user_choices(quiz: &Quiz, choices: &[Option<String>]) -> ScoreResult {
    let verdicts = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let given = choices.get(i).cloned().flatten();
            let correct = given
                .as_deref()
                .and_then(|label| label.chars().next())
                .is_some_and(|c| c == q.right_option.as_char());
            verdict(q, given, correct)
        })
        .collect();
    ScoreResult::from_verdicts(verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fixtures, AnswerSource};
    use OptionLetter::{A, B, C, D};

    fn answers(letters: &[OptionLetter]) -> Vec<ModelAnswer> {
        letters
            .iter()
            .map(|&letter| ModelAnswer {
                letter,
                source: AnswerSource::Model,
                reply: letter.to_string(),
            })
            .collect()
    }

    #[test]
    fn all_correct_scores_one() {
        let quiz = fixtures::quiz();
        let score = score_model_answers(&quiz, &answers(&[A, B, C, D, A]));
        assert_eq!(score.correct_count, 5);
        assert_eq!(score.total, 5);
        assert_eq!(score.fraction, 1.0);
        assert_eq!(score.percentage(), 100.0);
    }

    #[test]
    fn all_wrong_scores_zero() {
        let quiz = fixtures::quiz();
        let score = score_model_answers(&quiz, &answers(&[B, C, D, A, B]));
        assert_eq!(score.correct_count, 0);
        assert_eq!(score.fraction, 0.0);
    }

    #[test]
    fn missing_and_extra_answers() {
        let quiz = fixtures::quiz();
        let score = score_model_answers(&quiz, &answers(&[A, B]));
        assert_eq!(score.correct_count, 2);
        assert!((score.fraction - 0.4).abs() < f64::EPSILON);
        assert_eq!(score.verdicts[4].given, None);

        let score = score_model_answers(&quiz, &answers(&[A, B, C, D, A, A, A]));
        assert_eq!(score.correct_count, 5);
        assert_eq!(score.verdicts.len(), 5);
    }

    #[test]
    fn verdicts_reveal_right_option() {
        let quiz = fixtures::quiz();
        let score = score_model_answers(&quiz, &answers(&[D, D, D, D, D]));
        assert!(!score.verdicts[0].correct);
        assert_eq!(score.verdicts[0].right_option_text, "a. first");
        assert!(score.verdicts[3].correct);
        assert_eq!(score.verdicts[3].right_option_text, "d. fourth");
    }

    #[test]
    fn user_choices_compare_first_character() {
        let quiz = fixtures::quiz();
        let choices = vec![
            Some("a. first".to_string()),
            Some("b".to_string()),
            Some("c. whatever the label says".to_string()),
            Some("D. fourth".to_string()),
            None,
        ];
        let score = score_user_choices(&quiz, &choices);
        assert_eq!(
            score.verdicts.iter().map(|v| v.correct).collect::<Vec<_>>(),
            vec![true, true, true, false, false]
        );
        assert!((score.fraction - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_choice_is_incorrect() {
        let quiz = fixtures::quiz();
        let score = score_user_choices(&quiz, &[Some(String::new())]);
        assert_eq!(score.correct_count, 0);
        assert_eq!(score.total, 5);
    }

    #[test]
    fn scoring_is_idempotent() {
        let quiz = fixtures::quiz();
        let given = answers(&[A, C, C, A, A]);
        assert_eq!(
            score_model_answers(&quiz, &given),
            score_model_answers(&quiz, &given)
        );
    }

    #[test]
    fn empty_quiz_has_zero_fraction() {
        let quiz = Quiz {
            topic: "empty".into(),
            questions: vec![],
        };
        let score = score_user_choices(&quiz, &[]);
        assert_eq!(score.total, 0);
        assert_eq!(score.fraction, 0.0);
    }
}
