//! Configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use autoquizzer_core::engine::{AnsweringSettings, EngineConfig, GenerationSettings};
use autoquizzer_core::traits::{LlmProvider, WebSearch};

use crate::openai::OpenAiProvider;
use crate::serper::SerperSearch;

/// Environment variable holding the Groq API key.
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";
/// Environment variable holding the Serper.dev API key.
pub const SERPER_API_KEY_VAR: &str = "SERPERDEV_API_KEY";

/// One configured LLM backend. `Debug` never prints the key.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat completions endpoint (Groq by default).
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Configuration for the web search backend.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchConfig {
    Serper {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchConfig::Serper {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Serper")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

/// Top-level autoquizzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoquizzerConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Web search backend, required for web-RAG answering.
    #[serde(default)]
    pub search: Option<SearchConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for generation and answering.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub answering: AnsweringSettings,
    /// Output directory for session reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_provider() -> String {
    "groq".to_string()
}
fn default_model() -> String {
    "llama3-8b-8192".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./autoquizzer-results")
}

impl Default for AutoquizzerConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            search: None,
            default_provider: default_provider(),
            default_model: default_model(),
            generation: GenerationSettings::default(),
            answering: AnsweringSettings::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl AutoquizzerConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            model: self.default_model.clone(),
            generation: self.generation.clone(),
            answering: self.answering.clone(),
        }
    }

    /// The configuration of the default provider.
    pub fn default_provider_config(&self) -> Result<&ProviderConfig> {
        self.providers.get(&self.default_provider).with_context(|| {
            format!(
                "provider '{}' is not configured (set {} or add it to autoquizzer.toml)",
                self.default_provider, GROQ_API_KEY_VAR
            )
        })
    }
}

/// Expand `${VAR}` references from the environment. Unset variables expand
/// to nothing; an unterminated `${` is kept literally.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find("${") {
        let Some(len) = rest[open + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&std::env::var(&rest[open + 2..open + 2 + len]).unwrap_or_default());
        rest = &rest[open + 3 + len..];
    }
    out.push_str(rest);
    out
}

fn expand_in_place(api_key: &mut String, base_url: &mut Option<String>) {
    *api_key = resolve_env_vars(api_key);
    if let Some(url) = base_url {
        *url = resolve_env_vars(url);
    }
}

/// Insert or override the `groq` provider and the Serper search key.
fn apply_key_overrides(
    config: &mut AutoquizzerConfig,
    groq_key: Option<String>,
    serper_key: Option<String>,
) {
    if let Some(key) = groq_key {
        let entry = config
            .providers
            .entry("groq".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
            });
        let ProviderConfig::OpenAI { api_key, .. } = entry;
        *api_key = key;
    }

    if let Some(key) = serper_key {
        match &mut config.search {
            Some(SearchConfig::Serper { api_key, .. }) => *api_key = key,
            None => {
                config.search = Some(SearchConfig::Serper {
                    api_key: key,
                    base_url: None,
                })
            }
        }
    }
}

/// Load configuration from `path`, which must exist, or else from
/// `./autoquizzer.toml`, then `~/.config/autoquizzer/config.toml`, then
/// defaults.
///
/// Non-empty `GROQ_API_KEY` and `SERPERDEV_API_KEY` override the file.
pub fn load_config_from(path: Option<&Path>) -> Result<AutoquizzerConfig> {
    let source = match path {
        Some(p) if !p.exists() => anyhow::bail!("config file not found: {}", p.display()),
        Some(p) => Some(p.to_path_buf()),
        None => [Some(PathBuf::from("autoquizzer.toml")), user_config_file()]
            .into_iter()
            .flatten()
            .find(|candidate| candidate.exists()),
    };

    let mut config = match source {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let parsed: AutoquizzerConfig = toml::from_str(&text)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            parsed
        }
        None => AutoquizzerConfig::default(),
    };

    let from_env = |var: &str| std::env::var(var).ok().filter(|k| !k.is_empty());
    apply_key_overrides(&mut config, from_env(GROQ_API_KEY_VAR), from_env(SERPER_API_KEY_VAR));

    for provider in config.providers.values_mut() {
        let ProviderConfig::OpenAI { api_key, base_url } = provider;
        expand_in_place(api_key, base_url);
    }
    if let Some(SearchConfig::Serper { api_key, base_url }) = &mut config.search {
        expand_in_place(api_key, base_url);
    }

    Ok(config)
}

fn user_config_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config/autoquizzer/config.toml"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::OpenAI { api_key, base_url } => {
            if api_key.trim().is_empty() {
                anyhow::bail!("provider '{name}' has no API key");
            }
            Ok(Box::new(OpenAiProvider::new(api_key, base_url.clone())))
        }
    }
}

/// Create a web search backend from its configuration.
pub fn create_search(config: &SearchConfig) -> Result<Box<dyn WebSearch>> {
    match config {
        SearchConfig::Serper { api_key, base_url } => {
            if api_key.trim().is_empty() {
                anyhow::bail!("search backend has no API key (set {SERPER_API_KEY_VAR})");
            }
            Ok(Box::new(SerperSearch::new(api_key, base_url.clone())))
        }
    }
}
