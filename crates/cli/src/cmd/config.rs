//! Configuration management command
//!
//! Provides CLI interface to view and edit the configuration file.

use crate::config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = config::load()?;
    let config_path = config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[history]".yellow());
    println!("  {} = {}", "enabled".cyan(), config.history.enabled);
    println!(
        "  {} = {} {}",
        "strict".cyan(),
        config.history.strict,
        "(fail saves when history cannot be recorded)".dimmed()
    );
    println!(
        "  {} = {}",
        "extensions".cyan(),
        config.history.extensions.join(",")
    );
    println!("  {} = {}", "codec".cyan(), config.history.codec.as_str());
    println!(
        "  {} = {}",
        "scratch_dir".cyan(),
        match &config.history.scratch_dir {
            Some(dir) => dir.display().to_string(),
            None => "(system temp dir)".dimmed().to_string(),
        }
    );

    println!("\n{}", "[editor]".yellow());
    println!("  {} = {}", "unix_eol".cyan(), config.editor.unix_eol);
    println!(
        "  {} = {}",
        "default_user".cyan(),
        if config.editor.default_user.is_empty() {
            "(anonymous)".dimmed().to_string()
        } else {
            config.editor.default_user.clone()
        }
    );
    println!("  {} = {}", "default_ip".cyan(), config.editor.default_ip);

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = config::load()?;

    let value = match key {
        "history.enabled" => config.history.enabled.to_string(),
        "history.strict" => config.history.strict.to_string(),
        "history.extensions" => config.history.extensions.join(","),
        "history.codec" => config.history.codec.as_str().to_string(),
        "history.scratch_dir" => config
            .history
            .scratch_dir
            .map(|d| d.display().to_string())
            .unwrap_or_default(),
        "editor.unix_eol" => config.editor.unix_eol.to_string(),
        "editor.default_user" => config.editor.default_user,
        "editor.default_ip" => config.editor.default_ip,
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'folio config list' to see available keys.",
            key
        ),
    };

    println!("{}", value);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = config::load()?;

    match key {
        "history.enabled" => {
            config.history.enabled = value
                .parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        "history.strict" => {
            config.history.strict = value
                .parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        "history.extensions" => {
            config.history.extensions = value
                .split(',')
                .map(|e| e.trim().to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
        }
        "history.codec" => {
            config.history.codec = value.parse().map_err(anyhow::Error::msg)?;
        }
        "history.scratch_dir" => {
            config.history.scratch_dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        "editor.unix_eol" => {
            config.editor.unix_eol = value
                .parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        "editor.default_user" => config.editor.default_user = value.to_string(),
        "editor.default_ip" => config.editor.default_ip = value.to_string(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'folio config list' to see available keys.",
            key
        ),
    }

    // Validate before saving
    config.validate().context("Invalid configuration value")?;

    config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}
