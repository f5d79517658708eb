//! The `autoquizzer closed-book` and `autoquizzer web-rag` commands.

use std::path::PathBuf;

use anyhow::Result;

use autoquizzer_core::report::AnswerMode;
use autoquizzer_providers::config::load_config_from;
use autoquizzer_report::markdown::{mode_details, score_line};

use super::{build_engine, load_quiz};

pub async fn execute(
    quiz_path: PathBuf,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    mode: AnswerMode,
) -> Result<()> {
    let quiz = load_quiz(&quiz_path)?;
    let config = load_config_from(config_path.as_deref())?;
    let engine = build_engine(&config, seed, mode == AnswerMode::WebRag)?;

    eprintln!("{} answering with {}...", mode.label(), config.default_model);
    let run = engine.run_mode(&quiz, mode).await?;

    println!("{}", mode_details(&quiz, &run));
    println!("{}", score_line(mode, &run.score));
    let fallbacks = run.fallback_count();
    if fallbacks > 0 {
        println!("{fallbacks} answer(s) were random fallbacks.");
    }
    Ok(())
}
