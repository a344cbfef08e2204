pub mod configure;
pub mod filter;
pub mod kv;
pub mod namespace;
pub mod route;
pub mod script;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use workers_kit_client::{Client, Outcome};
use workers_kit_core::{ClientConfig, Envelope, Scope, parse_config};

/// Client plus the scope given on the command line
pub struct Ctx {
    pub client: Client,
    pub scope: Scope,
}

/// Get path to the config file
pub fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(".workers-kit").join("config.toml"))
}

/// Config file values (if the file exists) with environment overrides on top
pub fn load_config(explicit: Option<PathBuf>) -> Result<ClientConfig> {
    let path = config_path(explicit)?;
    let config = if path.exists() {
        parse_config(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?
    } else {
        tracing::debug!(path = %path.display(), "no config file, using environment only");
        ClientConfig::default()
    };
    Ok(config.merge_env())
}

pub fn connect(explicit: Option<PathBuf>, scope: Scope) -> Result<Ctx> {
    let config = load_config(explicit)?;
    let client = Client::new(config).context("Failed to create Cloudflare client")?;
    Ok(Ctx { client, scope })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an unwrapped result, or fail with the envelope's first error
pub fn print_outcome<T: Serialize>(outcome: Outcome<T>) -> Result<()> {
    match outcome {
        Outcome::Unwrapped(value) => print_json(&value),
        Outcome::Raw(envelope) => Err(api_error(&envelope)),
    }
}

/// Print a mutation envelope; an unsuccessful one becomes an error
pub fn print_envelope(envelope: &Envelope) -> Result<()> {
    if !envelope.success {
        return Err(api_error(envelope));
    }
    match &envelope.result {
        Some(result) => print_json(result),
        None => Ok(()),
    }
}

fn api_error(envelope: &Envelope) -> anyhow::Error {
    match envelope.first_error() {
        Some(error) => anyhow::anyhow!("Cloudflare API error {}: {}", error.code, error.message),
        None => anyhow::anyhow!("Unknown Cloudflare API error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workers_kit_core::ApiMessage;

    #[test]
    fn test_explicit_config_path_wins() {
        let path = config_path(Some(PathBuf::from("/tmp/custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_load_config_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[http]\nbase_url = \"http://127.0.0.1:9/client/v4\"\n",
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9/client/v4");
    }

    #[test]
    fn test_load_config_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http]\nbase_url = \"ftp://nope\"\n").unwrap();

        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_unsuccessful_envelope_is_error() {
        let envelope = Envelope {
            success: false,
            errors: vec![ApiMessage {
                code: 10014,
                message: "already exists".to_string(),
            }],
            ..Envelope::default()
        };
        let err = print_envelope(&envelope).unwrap_err();
        assert_eq!(err.to_string(), "Cloudflare API error 10014: already exists");
    }

    #[test]
    fn test_successful_envelope_prints() {
        let envelope = Envelope {
            success: true,
            result: Some(json!({"id": "x"})),
            ..Envelope::default()
        };
        assert!(print_envelope(&envelope).is_ok());
        assert!(print_outcome(Outcome::Unwrapped(vec![1, 2])).is_ok());
    }
}
