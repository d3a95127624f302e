//! `flowparty schematic` and `flowparty config`

use anyhow::{Context, Result};
use flowparty::core::FormConfig;
use flowparty::runtime::submission_pipeline;
use std::path::Path;

pub fn run_schematic_command(output: Option<&Path>) -> Result<()> {
    let schematic = submission_pipeline()
        .into_schematic()
        .with_description("Contact form submission: deliver to relay, check acceptance");
    let json = serde_json::to_string_pretty(&schematic).context("Failed to serialize schematic")?;

    match output {
        Some(path) => {
            std::fs::write(path, json.as_bytes()).context("Failed to write output file")?;
            println!("Schematic saved to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

pub fn run_config_command(config_path: Option<&Path>) -> Result<()> {
    let config = FormConfig::load(config_path).context("Failed to load configuration")?;

    println!("endpoint     = {}", config.endpoint);
    println!(
        "access_key   = {}",
        match &config.access_key {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => "(not set)".to_string(),
        }
    );
    println!("reentry      = {:?}", config.reentry);
    println!(
        "timeout_secs = {}",
        config
            .timeout_secs
            .map_or_else(|| "none".to_string(), |s| s.to_string())
    );

    Ok(())
}
