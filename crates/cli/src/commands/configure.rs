use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use workers_kit_core::config::render_config;
use workers_kit_core::{ClientConfig, parse_config};

use super::config_path;

/// Helper to read user input
fn read_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt with the current value as default; `none` clears an optional value
fn prompt_value(label: &str, current: Option<&str>, mask: bool) -> Result<Option<String>> {
    let input = match current {
        Some(value) if mask => read_input(&format!(
            "{} [current: {}...]: ",
            label,
            value.chars().take(4).collect::<String>()
        ))?,
        Some(value) => read_input(&format!("{} [current: {}]: ", label, value))?,
        None => read_input(&format!("{}: ", label))?,
    };
    Ok(apply_input(current, &input))
}

fn apply_input(current: Option<&str>, input: &str) -> Option<String> {
    if input.is_empty() {
        current.map(str::to_string)
    } else if input.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(input.to_string())
    }
}

fn save_config(path: &Path, config: &ClientConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let contents = render_config(config).context("Failed to serialize config")?;
    fs::write(path, contents).context("Failed to write config file")?;
    println!("✅ Configuration saved to: {}", path.display());
    Ok(())
}

/// Configure Cloudflare credentials and default scope
pub async fn run(explicit: Option<PathBuf>) -> Result<()> {
    println!("🔧 Configuring Cloudflare access...\n");

    let path = config_path(explicit)?;
    let existing = if path.exists() {
        parse_config(&path).context("Failed to parse config file")?
    } else {
        ClientConfig::default()
    };

    println!("📋 You'll need:");
    println!("   1. The email address of your Cloudflare login");
    println!("   2. Your Global API Key");
    println!("      Find at: https://dash.cloudflare.com/profile/api-tokens");
    println!("   3. Account ID and/or Zone ID (optional defaults)");
    println!("      Find at: https://dash.cloudflare.com/ (right sidebar)");
    println!();

    let auth_email = prompt_value("Auth email", existing.auth_email.as_deref(), false)?;
    if auth_email.is_none() {
        anyhow::bail!("Auth email is required");
    }
    let auth_key = prompt_value("Auth key", existing.auth_key.as_deref(), true)?;
    if auth_key.is_none() {
        anyhow::bail!("Auth key is required");
    }
    let account_id = prompt_value(
        "Default account ID (Enter to keep, 'none' to clear)",
        existing.account_id.as_deref(),
        false,
    )?;
    let zone_id = prompt_value(
        "Default zone ID (Enter to keep, 'none' to clear)",
        existing.zone_id.as_deref(),
        false,
    )?;

    let config = ClientConfig {
        auth_email,
        auth_key,
        account_id,
        zone_id,
        ..existing
    };
    save_config(&path, &config)?;

    println!();
    println!("🚀 Ready! Try: workers-kit namespace list");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_input_keeps_current_on_enter() {
        assert_eq!(apply_input(Some("13"), ""), Some("13".to_string()));
        assert_eq!(apply_input(None, ""), None);
    }

    #[test]
    fn test_apply_input_replaces_and_clears() {
        assert_eq!(apply_input(Some("13"), "14"), Some("14".to_string()));
        assert_eq!(apply_input(Some("13"), "NONE"), None);
    }

    #[test]
    fn test_save_config_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ClientConfig::default()
            .with_credentials("ops@example.com", "secret")
            .with_account_id("13");

        save_config(&path, &config).unwrap();
        assert_eq!(parse_config(&path).unwrap(), config);
    }
}
