//! Serper.dev Google search provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use autoquizzer_core::traits::{SearchHit, WebSearch};

use crate::http;

const DEFAULT_BASE_URL: &str = "https://google.serper.dev";
const TIMEOUT_SECS: u64 = 30;

/// Web search through the Serper.dev API.
pub struct SerperSearch {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl SerperSearch {
    pub fn new(api_key: &str, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            endpoint: format!("{}/search", base.trim_end_matches('/')),
            api_key: api_key.to_string(),
            client: http::client(TIMEOUT_SECS, None),
        }
    }
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SerperResponse {
    #[serde(default)]
    answer_box: Option<AnswerBox>,
    #[serde(default)]
    knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerBox {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    snippet_highlighted: Vec<String>,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeGraph {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    description_link: Option<String>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl SerperResponse {
    /// Answer box, then knowledge graph, then organic results.
    fn into_hits(self) -> Vec<SearchHit> {
        let mut hits = Vec::new();

        if let Some(answer_box) = self.answer_box {
            let content = answer_box
                .answer
                .or(answer_box.snippet)
                .or_else(|| {
                    (!answer_box.snippet_highlighted.is_empty())
                        .then(|| answer_box.snippet_highlighted.join(" "))
                });
            if let Some(content) = content {
                hits.push(SearchHit {
                    content,
                    title: answer_box.title,
                    link: answer_box.link,
                });
            }
        }

        if let Some(graph) = self.knowledge_graph {
            if let Some(description) = graph.description {
                hits.push(SearchHit {
                    content: description,
                    title: graph.title,
                    link: graph.description_link,
                });
            }
        }

        hits.extend(self.organic.into_iter().filter_map(|r| {
            r.snippet.map(|snippet| SearchHit {
                content: snippet,
                title: r.title,
                link: r.link,
            })
        }));

        hits
    }
}

#[async_trait]
impl WebSearch for SerperSearch {
    fn name(&self) -> &str {
        "serper"
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest { q: query, num: top_k })
            .send()
            .await
            .map_err(|e| http::transport_error(e, TIMEOUT_SECS))?;
        let response = http::check_status(response, None).await?;
        let parsed: SerperResponse = response.json().await.map_err(http::decode_error)?;

        let mut hits = parsed.into_hits();
        hits.truncate(top_k);
        tracing::debug!(hits = hits.len(), "search complete");
        Ok(hits)
    }
}
