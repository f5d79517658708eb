//! The `autoquizzer init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("autoquizzer.toml").exists() {
        println!("autoquizzer.toml already exists, skipping.");
    } else {
        std::fs::write("autoquizzer.toml", SAMPLE_CONFIG)?;
        println!("Created autoquizzer.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export GROQ_API_KEY and SERPERDEV_API_KEY (or edit autoquizzer.toml)");
    println!("  2. Run: autoquizzer generate --url <URL> --output quiz.json");
    println!("  3. Run: autoquizzer play --quiz quiz.json");
    println!("  4. Run: autoquizzer run --url <URL> --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# autoquizzer configuration

default_provider = "groq"
default_model = "llama3-8b-8192"
output_dir = "./autoquizzer-results"

[providers.groq]
type = "openai"
api_key = "${GROQ_API_KEY}"

[search]
type = "serper"
api_key = "${SERPERDEV_API_KEY}"

[generation]
max_tokens = 1000
temperature = 0.5
top_p = 1.0
text_budget_chars = 4000
max_attempts = 2

[answering]
max_tokens = 5
temperature = 0.0
top_p = 1.0
search_top_k = 3
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use autoquizzer_providers::AutoquizzerConfig;

    #[test]
    fn sample_config_parses_to_defaults() {
        let parsed: AutoquizzerConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        let defaults = AutoquizzerConfig::default();
        assert_eq!(parsed.generation, defaults.generation);
        assert_eq!(parsed.answering, defaults.answering);
        assert_eq!(parsed.default_model, defaults.default_model);
        assert!(parsed.providers.contains_key("groq"));
        assert!(parsed.search.is_some());
    }
}
