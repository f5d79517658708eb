//! Aggregate statistics across sessions.

use serde::{Deserialize, Serialize};

use crate::report::{AnswerMode, ModeRun, SessionReport};

/// Statistics for one answering mode across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeStats {
    pub mode: AnswerMode,
    /// Sessions that ran this mode.
    pub sessions: usize,
    pub total_questions: usize,
    pub total_correct: usize,
    /// Mean of the per-session score fractions.
    pub mean_fraction: f64,
    /// Share of answers that came from the random fallback.
    pub fallback_rate: f64,
    /// Average pass duration in milliseconds.
    pub avg_duration_ms: u64,
}

/// Aggregate statistics across all sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub sessions: usize,
    /// Average generation attempts per session.
    pub mean_generation_attempts: f64,
    pub closed_book: Option<ModeStats>,
    pub web_rag: Option<ModeStats>,
    /// Mean web-RAG fraction minus mean closed-book fraction, over sessions
    /// that ran both modes.
    pub web_rag_lift: Option<f64>,
}

fn mode_stats(mode: AnswerMode, runs: &[&ModeRun]) -> Option<ModeStats> {
    if runs.is_empty() {
        return None;
    }

    let n = runs.len();
    let total_questions: usize = runs.iter().map(|r| r.score.total).sum();
    let total_correct: usize = runs.iter().map(|r| r.score.correct_count).sum();
    let answers: usize = runs.iter().map(|r| r.answers.len()).sum();
    let fallbacks: usize = runs.iter().map(|r| r.fallback_count()).sum();

    Some(ModeStats {
        mode,
        sessions: n,
        total_questions,
        total_correct,
        mean_fraction: runs.iter().map(|r| r.score.fraction).sum::<f64>() / n as f64,
        fallback_rate: if answers == 0 {
            0.0
        } else {
            fallbacks as f64 / answers as f64
        },
        avg_duration_ms: runs.iter().map(|r| r.duration_ms).sum::<u64>() / n as u64,
    })
}

/// Compute aggregate statistics from session reports.
pub fn aggregate(reports: &[SessionReport]) -> AggregateStats {
    let closed: Vec<&ModeRun> = reports.iter().filter_map(|r| r.closed_book.as_ref()).collect();
    let rag: Vec<&ModeRun> = reports.iter().filter_map(|r| r.web_rag.as_ref()).collect();

    let paired: Vec<f64> = reports
        .iter()
        .filter_map(|r| match (&r.closed_book, &r.web_rag) {
            (Some(c), Some(w)) => Some(w.score.fraction - c.score.fraction),
            _ => None,
        })
        .collect();
    let web_rag_lift = if paired.is_empty() {
        None
    } else {
        Some(paired.iter().sum::<f64>() / paired.len() as f64)
    };

    let mean_generation_attempts = if reports.is_empty() {
        0.0
    } else {
        reports
            .iter()
            .map(|r| r.generation_attempts as f64)
            .sum::<f64>()
            / reports.len() as f64
    };

    AggregateStats {
        sessions: reports.len(),
        mean_generation_attempts,
        closed_book: mode_stats(AnswerMode::ClosedBook, &closed),
        web_rag: mode_stats(AnswerMode::WebRag, &rag),
        web_rag_lift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::model::OptionLetter::*;
    use crate::report::test_support::run;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input() {
        let stats = aggregate(&[]);
        assert_eq!(stats.sessions, 0);
        assert!(stats.closed_book.is_none());
        assert!(stats.web_rag_lift.is_none());
    }

    #[test]
    fn per_mode_means_and_lift() {
        let quiz = fixtures::quiz();

        let mut first = SessionReport::new("https://a.example", "m", quiz.clone(), 1);
        first.record(run(&quiz, AnswerMode::ClosedBook, &[A, B, A, A, A])); // 3/5
        first.record(run(&quiz, AnswerMode::WebRag, &[A, B, C, D, A])); // 5/5

        let mut second = SessionReport::new("https://b.example", "m", quiz.clone(), 2);
        second.record(run(&quiz, AnswerMode::ClosedBook, &[A, A, A, A, A])); // 2/5

        let stats = aggregate(&[first, second]);
        assert_eq!(stats.sessions, 2);
        assert!(approx(stats.mean_generation_attempts, 1.5));

        let closed = stats.closed_book.unwrap();
        assert_eq!(closed.sessions, 2);
        assert_eq!(closed.total_questions, 10);
        assert_eq!(closed.total_correct, 5);
        assert!(approx(closed.mean_fraction, 0.5));
        assert_eq!(closed.fallback_rate, 0.0);

        let rag = stats.web_rag.unwrap();
        assert_eq!(rag.sessions, 1);
        assert!(approx(rag.mean_fraction, 1.0));

        // Only the first session ran both modes.
        assert!(approx(stats.web_rag_lift.unwrap(), 0.4));
    }
}
