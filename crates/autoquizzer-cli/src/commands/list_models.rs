//! The `autoquizzer list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use autoquizzer_providers::config::{load_config_from, GROQ_API_KEY_VAR};
use autoquizzer_providers::create_provider;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    for name in &names {
        let provider = create_provider(name, &config.providers[*name])?;
        let default = if **name == config.default_provider {
            " (default)"
        } else {
            ""
        };
        println!("Provider: {name}{default}");
        for model in provider.available_models() {
            println!(
                "  {}: {} ({}K context)",
                model.id,
                model.name,
                model.max_context / 1024
            );
        }
        println!();
    }

    if names.is_empty() {
        println!(
            "No providers configured. Set {GROQ_API_KEY_VAR} or run `autoquizzer init` to create a config file."
        );
    }

    Ok(())
}
