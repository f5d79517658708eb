//! OpenAI-compatible chat completions provider.
//!
//! Defaults to Groq's OpenAI-compatible endpoint; any server speaking
//! `/v1/chat/completions` works with a custom base URL.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use autoquizzer_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

use crate::http;

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
const TIMEOUT_SECS: u64 = 120;

/// Chat completions client for OpenAI-compatible servers.
pub struct OpenAiProvider {
    endpoint: String,
    bearer: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| GROQ_BASE_URL.to_string());
        Self {
            endpoint: format!("{}/v1/chat/completions", base.trim_end_matches('/')),
            bearer: format!("Bearer {api_key}"),
            client: http::client(TIMEOUT_SECS, None),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
    model: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let started = Instant::now();

        let messages = request
            .system_prompt
            .iter()
            .map(|system| ChatMessage {
                role: "system",
                content: system.clone(),
            })
            .chain(std::iter::once(ChatMessage {
                role: "user",
                content: request.prompt.clone(),
            }))
            .collect();

        let body = ChatRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.bearer)
            .json(&body)
            .send()
            .await
            .map_err(|e| http::transport_error(e, TIMEOUT_SECS))?;
        let response = http::check_status(response, Some(request.model.as_str())).await?;
        let completion: ChatResponse = response.json().await.map_err(http::decode_error)?;

        let latency_ms = started.elapsed().as_millis() as u64;
        let content = completion
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default();
        tracing::debug!(latency_ms, chars = content.len(), "completion received");

        let usage = completion.usage;
        Ok(GenerateResponse {
            content,
            model: completion.model,
            token_usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            latency_ms,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "llama3-8b-8192".into(),
                name: "Llama 3 8B".into(),
                provider: "groq".into(),
                max_context: 8_192,
            },
            ModelInfo {
                id: "llama3-70b-8192".into(),
                name: "Llama 3 70B".into(),
                provider: "groq".into(),
                max_context: 8_192,
            },
            ModelInfo {
                id: "mixtral-8x7b-32768".into(),
                name: "Mixtral 8x7B".into(),
                provider: "groq".into(),
                max_context: 32_768,
            },
            ModelInfo {
                id: "gemma-7b-it".into(),
                name: "Gemma 7B Instruct".into(),
                provider: "groq".into(),
                max_context: 8_192,
            },
        ]
    }
}
