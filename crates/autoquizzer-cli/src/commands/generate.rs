//! The `autoquizzer generate` command.

use std::path::PathBuf;

use anyhow::Result;

use autoquizzer_providers::config::load_config_from;

use super::{build_engine, print_quiz};

pub async fn execute(
    url: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = build_engine(&config, None, false)?;

    eprintln!("Generating quiz from {url} with {}...", config.default_model);
    let generated = engine.synthesize_with_retry(&url).await?;
    if generated.attempts > 1 {
        eprintln!("Quiz generated after {} attempts.", generated.attempts);
    }

    print_quiz(&generated.quiz);

    if let Some(path) = output {
        generated.quiz.save_json(&path)?;
        eprintln!("Quiz saved to: {}", path.display());
    }

    Ok(())
}
