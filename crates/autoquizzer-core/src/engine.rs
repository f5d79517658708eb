//! Quiz engine orchestrator.
//!
//! Fetches sources, generates and parses the quiz, and runs the closed-book
//! and web-RAG answering passes. Questions are answered one at a time in quiz
//! order.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::answer::FallbackPicker;
use crate::error::GenerationError;
use crate::model::{ModelAnswer, Quiz, Snippet};
use crate::parser::parse_quiz_reply;
use crate::prompts;
use crate::report::{AnswerMode, ModeRun};
use crate::traits::{
    GenerateRequest, LlmProvider, PageFetcher, TextExtractor, TokenUsage, WebSearch,
};

/// Model settings for quiz generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Character budget for each source text in the prompt.
    pub text_budget_chars: usize,
    /// Total attempts for [`QuizEngine::synthesize_with_retry`].
    pub max_attempts: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.5,
            top_p: 1.0,
            text_budget_chars: 4000,
            max_attempts: 2,
        }
    }
}

/// Model settings for the answering passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnsweringSettings {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Snippets requested per question in web-RAG mode.
    pub search_top_k: usize,
}

impl Default for AnsweringSettings {
    fn default() -> Self {
        Self {
            max_tokens: 5,
            temperature: 0.0,
            top_p: 1.0,
            search_top_k: 3,
        }
    }
}

/// Configuration for the quiz engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Model identifier used for every call.
    pub model: String,
    pub generation: GenerationSettings,
    pub answering: AnsweringSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: "llama3-8b-8192".into(),
            generation: GenerationSettings::default(),
            answering: AnsweringSettings::default(),
        }
    }
}

/// A successfully generated quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub quiz: Quiz,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Web-RAG answers with the snippets that informed them.
#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswers {
    pub answers: Vec<ModelAnswer>,
    /// Snippets per question, aligned with the quiz.
    pub snippets: Vec<Vec<Snippet>>,
    /// Tokens spent across the pass.
    pub usage: TokenUsage,
}

/// The central quiz engine.
pub struct QuizEngine {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn TextExtractor>,
    provider: Arc<dyn LlmProvider>,
    search: Option<Arc<dyn WebSearch>>,
    config: EngineConfig,
    picker: FallbackPicker,
}

impl QuizEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn TextExtractor>,
        provider: Arc<dyn LlmProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            provider,
            search: None,
            config,
            picker: FallbackPicker::new(),
        }
    }

    /// Enable web-RAG answering.
    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Replace the fallback random source, e.g. with a seeded one.
    pub fn with_picker(mut self, picker: FallbackPicker) -> Self {
        self.picker = picker;
        self
    }

    /// Fetch and extract each source. Failing sources are skipped.
    async fn collect_texts(&self, urls: &[&str]) -> Result<Vec<String>, GenerationError> {
        let mut texts = Vec::new();
        for url in urls {
            let extracted = match self.fetcher.fetch(url).await {
                Ok(bytes) => self.extractor.extract_text(&bytes),
                Err(e) => Err(e),
            };
            match extracted {
                Ok(text) => texts.push(text),
                Err(e) => tracing::warn!("skipping source {url}: {e}"),
            }
        }

        if texts.is_empty() {
            return Err(GenerationError::NoContent(urls.join(", ")));
        }
        Ok(texts)
    }

    /// Generate a quiz from the page at `url`.
    pub async fn synthesize(&self, url: &str) -> Result<Quiz, GenerationError> {
        tracing::info!(url, model = %self.config.model, "generating quiz");
        let texts = self.collect_texts(&[url]).await?;

        let settings = &self.config.generation;
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompts::quiz_generation(&texts, settings.text_budget_chars),
            system_prompt: None,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
        };

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(GenerationError::Model)?;

        let parsed = parse_quiz_reply(&response.content);
        if parsed.is_repaired() {
            tracing::debug!("quiz reply needed JSON repair");
        }
        let quiz = parsed.into_result()?;
        quiz.check_shape()?;
        Ok(quiz)
    }

    /// [`synthesize`](Self::synthesize) with up to `max_attempts` total
    /// attempts. Any error triggers another attempt; the last one is returned.
    pub async fn synthesize_with_retry(&self, url: &str) -> Result<Generated, GenerationError> {
        let max_attempts = self.config.generation.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.synthesize(url).await {
                Ok(quiz) => {
                    if attempt > 1 {
                        tracing::info!(url, attempts = attempt, "quiz generated after retry");
                    }
                    return Ok(Generated {
                        quiz,
                        attempts: attempt,
                    });
                }
                Err(e) if attempt < max_attempts => {
                    tracing::warn!("quiz generation attempt {attempt}/{max_attempts} failed: {e}");
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!("quiz generation attempt {attempt}/{max_attempts} failed: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Send one answering prompt and normalize the reply.
    async fn ask(&self, prompt: String) -> Result<(ModelAnswer, TokenUsage)> {
        let settings = &self.config.answering;
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system_prompt: None,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
        };
        let response = self.provider.generate(&request).await?;
        Ok((self.picker.normalize(&response.content), response.token_usage))
    }

    /// Answer every question from the model's own knowledge.
    pub async fn answer_closed_book(&self, quiz: &Quiz) -> Result<Vec<ModelAnswer>> {
        Ok(self.closed_book_pass(quiz).await?.0)
    }

    async fn closed_book_pass(&self, quiz: &Quiz) -> Result<(Vec<ModelAnswer>, TokenUsage)> {
        let mut answers = Vec::with_capacity(quiz.questions.len());
        let mut usage = TokenUsage::default();
        for question in &quiz.questions {
            let prompt = prompts::closed_book(&quiz.topic, question);
            let (answer, spent) = self.ask(prompt).await?;
            answers.push(answer);
            usage.add(spent);
        }
        Ok((answers, usage))
    }

    /// Answer every question with web search snippets in the prompt.
    ///
    /// A missing or failing search degrades to an empty snippet list; the
    /// model is still asked every question.
    pub async fn answer_with_web_rag(&self, quiz: &Quiz) -> Result<RagAnswers> {
        if self.search.is_none() {
            tracing::warn!("no web search configured, answering without snippets");
        }
        let top_k = self.config.answering.search_top_k;

        let mut answers = Vec::with_capacity(quiz.questions.len());
        let mut snippets = Vec::with_capacity(quiz.questions.len());
        let mut usage = TokenUsage::default();
        for question in &quiz.questions {
            let found = self.snippets_for(&question.question, top_k).await;
            let prompt = prompts::web_rag(&quiz.topic, question, &found);
            let (answer, spent) = self.ask(prompt).await?;
            answers.push(answer);
            snippets.push(found);
            usage.add(spent);
        }

        Ok(RagAnswers {
            answers,
            snippets,
            usage,
        })
    }

    async fn snippets_for(&self, query: &str, top_k: usize) -> Vec<Snippet> {
        let Some(search) = &self.search else {
            return Vec::new();
        };
        match search.search(query, top_k).await {
            Ok(hits) => hits.into_iter().take(top_k).map(Snippet::from).collect(),
            Err(e) => {
                tracing::warn!("search via {} failed: {e:#}", search.name());
                Vec::new()
            }
        }
    }

    /// Run one answering mode and score it.
    pub async fn run_mode(&self, quiz: &Quiz, mode: AnswerMode) -> Result<ModeRun> {
        let start = Instant::now();
        let (answers, snippets, usage) = match mode {
            AnswerMode::ClosedBook => {
                let (answers, usage) = self.closed_book_pass(quiz).await?;
                (answers, Vec::new(), usage)
            }
            AnswerMode::WebRag => {
                let rag = self.answer_with_web_rag(quiz).await?;
                (rag.answers, rag.snippets, rag.usage)
            }
        };
        let mut run = ModeRun::new(
            quiz,
            mode,
            answers,
            snippets,
            start.elapsed().as_millis() as u64,
        );
        run.token_usage = usage;
        tracing::info!(
            %mode,
            correct = run.score.correct_count,
            total = run.score.total,
            fallbacks = run.fallback_count(),
            tokens = run.token_usage.total_tokens,
            "answering pass complete"
        );
        Ok(run)
    }
}
