//! Markdown rendering of answering passes and whole sessions.

use std::fmt::Write as _;

use autoquizzer_core::model::Quiz;
use autoquizzer_core::report::{AnswerMode, ModeRun, SessionReport};
use autoquizzer_core::scoring::ScoreResult;

/// One-line score summary, e.g. `LLM web RAG score is 80%`.
pub fn score_line(mode: AnswerMode, score: &ScoreResult) -> String {
    let name = match mode {
        AnswerMode::ClosedBook => "closed book",
        AnswerMode::WebRag => "web RAG",
    };
    format!("LLM {name} score is {:.0}%", score.percentage())
}

/// Per-question review of one answering pass.
///
/// Web-RAG runs list the snippets each answer was given.
pub fn mode_details(quiz: &Quiz, run: &ModeRun) -> String {
    let mut out = String::new();
    for detail in run.details(quiz) {
        let _ = write!(out, "**Question**: {}\n\n", detail.question);
        let _ = write!(out, "**Answer from LLM**: {}", detail.model_answer);
        if detail.fallback {
            out.push_str(" _(random fallback)_");
        }
        out.push_str("\n\n");
        let _ = write!(out, "**Correct answer**: {}\n\n", detail.correct_answer);

        if run.mode == AnswerMode::WebRag {
            if detail.snippets.is_empty() {
                out.push_str("**No snippets found in web search**\n\n");
            } else {
                let _ = write!(
                    out,
                    "**Top {} snippets from web search**:\n\n",
                    detail.snippets.len()
                );
                for snippet in &detail.snippets {
                    let _ = writeln!(out, "- {}", snippet.content.replace('\n', " "));
                }
            }
        }
        out.push_str("---\n\n");
    }
    out
}

/// Full session write-up: quiz, user score and every recorded run.
pub fn session_markdown(report: &SessionReport) -> String {
    let mut out = String::new();

    let _ = write!(out, "# Quiz: {}\n\n", report.quiz.topic);
    let _ = writeln!(out, "- Source: {}", report.url);
    let _ = writeln!(out, "- Model: {}", report.model);
    let _ = writeln!(out, "- Generation attempts: {}", report.generation_attempts);
    let _ = write!(
        out,
        "- Created: {}\n\n",
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    out.push_str("## Questions\n\n");
    for (i, question) in report.quiz.questions.iter().enumerate() {
        let _ = write!(out, "{}. {}\n\n", i + 1, question.question);
        for option in &question.options {
            let _ = writeln!(out, "   - {option}");
        }
        let _ = write!(
            out,
            "\n   Correct: **{}**\n\n",
            question.right_option_text()
        );
    }

    if let Some(user) = &report.user {
        let _ = write!(
            out,
            "## Your score\n\n{}/{} ({:.0}%)\n\n",
            user.correct_count,
            user.total,
            user.percentage()
        );
    }

    for run in report.runs() {
        let _ = write!(out, "## {}\n\n", run.mode.label());
        let _ = write!(out, "{}\n\n", score_line(run.mode, &run.score));
        let fallbacks = run.fallback_count();
        if fallbacks > 0 {
            let _ = write!(out, "{fallbacks} answer(s) were random fallbacks.\n\n");
        }
        out.push_str(&mode_details(&report.quiz, run));
    }

    if let Some(cmp) = report.compare_modes() {
        out.push_str("## Closed book vs web RAG\n\n");
        out.push_str("| Both correct | Only closed book | Only web RAG | Neither |\n");
        out.push_str("|---|---|---|---|\n");
        let _ = write!(
            out,
            "| {} | {} | {} | {} |\n\nNet gain from retrieval: {:+}\n",
            cmp.both_correct,
            cmp.only_closed_book,
            cmp.only_web_rag,
            cmp.neither,
            cmp.net_gain()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{quiz, run};
    use autoquizzer_core::model::{OptionLetter::*, Snippet};
    use autoquizzer_core::scoring::score_user_choices;

    #[test]
    fn closed_book_details_layout() {
        let quiz = quiz();
        let run = run(&quiz, AnswerMode::ClosedBook, &[A, C, C, D, A]);
        let details = mode_details(&quiz, &run);

        assert!(details.starts_with(
            "**Question**: Where do capybaras live?\n\n\
             **Answer from LLM**: a. South America\n\n\
             **Correct answer**: a. South America\n\n---\n\n"
        ));
        assert!(details.contains("**Answer from LLM**: c. Insects\n\n**Correct answer**: b. Grass"));
        assert!(!details.contains("snippets"));
        assert_eq!(details.matches("---").count(), 5);
    }

    #[test]
    fn web_rag_details_list_snippets() {
        let quiz = quiz();
        let mut run = run(&quiz, AnswerMode::WebRag, &[A, B, C, D, A]);
        run.snippets = vec![
            vec![Snippet::new("Native to South\nAmerica"), Snippet::new("Found near rivers")],
            vec![],
        ];
        let details = mode_details(&quiz, &run);

        assert!(details.contains(
            "**Top 2 snippets from web search**:\n\n- Native to South America\n- Found near rivers\n---"
        ));
        assert!(details.contains("**No snippets found in web search**"));
    }

    #[test]
    fn fallback_answers_are_marked() {
        let quiz = quiz();
        let mut run = run(&quiz, AnswerMode::ClosedBook, &[A, B, C, D, A]);
        run.answers[1].source = autoquizzer_core::model::AnswerSource::Fallback;
        let details = mode_details(&quiz, &run);
        assert_eq!(details.matches("_(random fallback)_").count(), 1);
    }

    #[test]
    fn session_markdown_has_all_sections() {
        let quiz = quiz();
        let mut report = SessionReport::new("https://example.org/capybara", "llama3-8b-8192", quiz.clone(), 2);
        report.user = Some(score_user_choices(
            &quiz,
            &[Some("a. South America".into()), None, None, None, None],
        ));
        report.record(run(&quiz, AnswerMode::ClosedBook, &[A, C, C, D, A]));
        report.record(run(&quiz, AnswerMode::WebRag, &[A, B, C, D, A]));

        let md = session_markdown(&report);
        assert!(md.starts_with("# Quiz: Capybaras\n"));
        assert!(md.contains("- Generation attempts: 2"));
        assert!(md.contains("## Your score\n\n1/5 (20%)"));
        assert!(md.contains("## Closed book\n\nLLM closed book score is 80%"));
        assert!(md.contains("## Web RAG\n\nLLM web RAG score is 100%"));
        assert!(md.contains("| 4 | 0 | 1 | 0 |"));
        assert!(md.contains("Net gain from retrieval: +1"));
    }
}
