pub mod answer;
pub mod generate;
pub mod init;
pub mod list_models;
pub mod play;
pub mod run;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};

use autoquizzer_core::answer::FallbackPicker;
use autoquizzer_core::engine::QuizEngine;
use autoquizzer_core::model::Quiz;
use autoquizzer_providers::config::SERPER_API_KEY_VAR;
use autoquizzer_providers::{
    create_provider, create_search, AutoquizzerConfig, HtmlTextExtractor, HttpFetcher,
};

/// Wire up an engine from the loaded configuration.
///
/// Search is attached only when `with_search` is set. Without a `[search]`
/// config the web-RAG pass still runs, with no snippets.
pub(crate) fn build_engine(
    config: &AutoquizzerConfig,
    seed: Option<u64>,
    with_search: bool,
) -> Result<QuizEngine> {
    let provider_config = config.default_provider_config()?;
    let provider = create_provider(&config.default_provider, provider_config)?;

    let mut engine = QuizEngine::new(
        Arc::new(HttpFetcher::new()),
        Arc::new(HtmlTextExtractor::new()),
        Arc::from(provider),
        config.engine_config(),
    );

    match (with_search, &config.search) {
        (true, Some(search_config)) => {
            engine = engine.with_search(Arc::from(create_search(search_config)?));
        }
        (true, None) => tracing::warn!(
            "web search is not configured (set {SERPER_API_KEY_VAR} or add [search] to the config)"
        ),
        (false, _) => {}
    }

    if let Some(seed) = seed {
        engine = engine.with_picker(FallbackPicker::seeded(seed));
    }

    Ok(engine)
}

/// Load a quiz file and reject malformed ones.
pub(crate) fn load_quiz(path: &std::path::Path) -> Result<Quiz> {
    let quiz = Quiz::load_json(path)?;
    quiz.check_shape()
        .with_context(|| format!("invalid quiz in {}", path.display()))?;
    Ok(quiz)
}

pub(crate) fn print_quiz(quiz: &Quiz) {
    println!("Topic: {}\n", quiz.topic);
    for (i, question) in quiz.questions.iter().enumerate() {
        println!("Q{}. {}", i + 1, question.question);
        for option in &question.options {
            println!("    {option}");
        }
        println!();
    }
}
