//! CLI Models Command
//!
//! Lists the model catalog of the configured provider.

use anyhow::Result;
use draftschema_config::Config;
use draftschema_providers::ProviderRegistry;

pub async fn run(config: &Config) -> Result<()> {
    let provider = ProviderRegistry::from_config(config).select(&config.provider)?;

    let reply = provider.list_models().await?;

    println!("\n🧠 Models available from {} (HTTP {})\n", provider.name(), reply.status);

    match serde_json::from_str::<serde_json::Value>(&reply.body) {
        Ok(catalog) => {
            let names: Vec<&str> = catalog["models"]
                .as_array()
                .map(|models| models.iter().filter_map(|m| m["name"].as_str()).collect())
                .unwrap_or_default();
            if names.is_empty() {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for name in names {
                    println!("  - {name}");
                }
            }
        }
        Err(_) => println!("{}", reply.body),
    }

    Ok(())
}
