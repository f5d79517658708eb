//! The `autoquizzer validate` command.

use std::path::PathBuf;

use anyhow::Result;

use autoquizzer_core::model::Quiz;
use autoquizzer_core::parser::lint_quiz;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quiz = Quiz::load_json(&quiz_path)?;
    println!("Quiz: {} ({} questions)", quiz.topic, quiz.questions.len());

    let warnings = lint_quiz(&quiz);
    for w in &warnings {
        let prefix = w
            .question
            .map(|n| format!("  [Q{n}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Quiz is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
