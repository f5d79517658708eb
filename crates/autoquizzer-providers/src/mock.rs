//! Test doubles for the engine's collaborators.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use autoquizzer_core::error::FetchError;
use autoquizzer_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, PageFetcher, SearchHit,
    TokenUsage, WebSearch,
};

/// A mock LLM provider for exercising the engine without real API calls.
///
/// Replies come from a scripted sequence first, then from prompt-substring
/// matches, then from the default response.
pub struct MockProvider {
    /// Map of prompt substring → reply.
    responses: HashMap<String, String>,
    /// Replies handed out in order before any matching.
    sequence: Mutex<VecDeque<String>>,
    /// Reply if nothing else applies.
    default_response: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given prompt→reply mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            sequence: Mutex::new(VecDeque::new()),
            default_response: "a".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn with_fixed_response(response: &str) -> Self {
        let mut mock = Self::new(HashMap::new());
        mock.default_response = response.to_string();
        mock
    }

    /// Queue replies returned in order by the next calls.
    pub fn with_sequence<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut sequence = self.sequence.lock().unwrap_or_else(|e| e.into_inner());
            sequence.extend(replies.into_iter().map(Into::into));
        }
        self
    }

    /// Number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        let scripted = self
            .sequence
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        let content = scripted.unwrap_or_else(|| {
            self.responses
                .iter()
                .find(|(key, _)| request.prompt.contains(key.as_str()))
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| self.default_response.clone())
        });

        // Rough estimate.
        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

/// A search backend returning canned hits, or failing on demand.
pub struct MockSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Hits built from plain snippet texts.
    pub fn with_snippets(snippets: &[&str]) -> Self {
        Self::new(
            snippets
                .iter()
                .map(|s| SearchHit {
                    content: s.to_string(),
                    title: None,
                    link: None,
                })
                .collect(),
        )
    }

    /// A backend whose every search errors.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SearchHit>> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(query.to_string());
        if self.fail {
            anyhow::bail!("mock search failure");
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

/// Serves pages from memory. Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 5,
            temperature: 0.0,
            top_p: 1.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("c");
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "c");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert("capybaras eat".to_string(), "b".to_string());
        responses.insert("capybaras live".to_string(), "a".to_string());
        let provider = MockProvider::new(responses);

        let resp = provider
            .generate(&request("question: What do capybaras eat?"))
            .await
            .unwrap();
        assert_eq!(resp.content, "b");

        let resp = provider
            .generate(&request("question: Where do capybaras live?"))
            .await
            .unwrap();
        assert_eq!(resp.content, "a");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn sequence_comes_first() {
        let provider = MockProvider::with_fixed_response("d").with_sequence(["x", "y"]);
        let mut replies = Vec::new();
        for _ in 0..3 {
            replies.push(provider.generate(&request("q")).await.unwrap().content);
        }
        assert_eq!(replies, vec!["x", "y", "d"]);
    }

    #[tokio::test]
    async fn mock_search_and_fetcher() {
        let search = MockSearch::with_snippets(&["one", "two", "three", "four"]);
        let hits = search.search("capybara", 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(search.queries(), vec!["capybara"]);
        assert!(MockSearch::failing().search("q", 3).await.is_err());

        let fetcher = StaticFetcher::new().with_page("https://a.example", "<p>hi</p>");
        assert_eq!(fetcher.fetch("https://a.example").await.unwrap(), b"<p>hi</p>");
        assert!(fetcher.fetch("https://b.example").await.is_err());
    }
}
