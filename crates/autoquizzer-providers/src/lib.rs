//! autoquizzer-providers: integrations behind the core traits.
//!
//! An OpenAI-compatible LLM provider (Groq by default), Serper.dev web
//! search, an HTTP page fetcher, an HTML text extractor, test doubles, and
//! the configuration that wires them together.

pub mod config;
pub mod extract;
pub mod fetch;
mod http;
pub mod mock;
pub mod openai;
pub mod serper;

pub use autoquizzer_core::error::ProviderError;
pub use config::{
    create_provider, create_search, load_config_from, AutoquizzerConfig,
    ProviderConfig, SearchConfig,
};
pub use extract::HtmlTextExtractor;
pub use fetch::HttpFetcher;
pub use openai::OpenAiProvider;
pub use serper::SerperSearch;
