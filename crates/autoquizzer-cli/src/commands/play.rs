//! The `autoquizzer play` command.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};

use autoquizzer_core::scoring::score_user_choices;

use super::{load_quiz, print_quiz};

/// One line per question: a letter or a full `"a. ..."` label.
/// Blank lines and missing lines count as unanswered.
pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quiz = load_quiz(&quiz_path)?;
    print_quiz(&quiz);
    println!("Answer with one letter per line (a, b, c or d).\n");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut choices = Vec::with_capacity(quiz.questions.len());
    for _ in &quiz.questions {
        let line = match lines.next() {
            Some(line) => line.context("failed to read answer from stdin")?,
            None => String::new(),
        };
        choices.push(to_choice(&line));
    }

    let score = score_user_choices(&quiz, &choices);
    for (i, verdict) in score.verdicts.iter().enumerate() {
        if verdict.correct {
            println!("Q{}: correct", i + 1);
        } else {
            println!(
                "Q{}: wrong, the answer is {}",
                i + 1,
                verdict.right_option_text
            );
        }
    }

    println!(
        "\nYour score: {}/{} ({:.0}%)",
        score.correct_count,
        score.total,
        score.percentage()
    );
    Ok(())
}

/// A lone letter is accepted in either case; labels pass through untouched.
fn to_choice(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() == 1 {
        return Some(trimmed.to_lowercase());
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_from_input_lines() {
        assert_eq!(to_choice("  "), None);
        assert_eq!(to_choice("B\n").as_deref(), Some("b"));
        assert_eq!(to_choice(" c. Insects ").as_deref(), Some("c. Insects"));
    }
}
