use crate::error::{Error, Result};
use crate::types::Scope;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Endpoint every relative API path is appended to
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

pub const ENV_AUTH_EMAIL: &str = "CLOUDFLARE_AUTH_EMAIL";
pub const ENV_AUTH_KEY: &str = "CLOUDFLARE_AUTH_KEY";
pub const ENV_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const ENV_ZONE_ID: &str = "CLOUDFLARE_ZONE_ID";
pub const ENV_HTTPS_PROXY: &str = "HTTPS_PROXY";
pub const ENV_HTTP_PROXY: &str = "HTTP_PROXY";

/// Everything a client needs: endpoint, credentials, default scope and proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub auth_email: Option<String>,
    pub auth_key: Option<String>,
    pub account_id: Option<String>,
    pub zone_id: Option<String>,
    pub proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_email: None,
            auth_key: None,
            account_id: None,
            zone_id: None,
            proxy: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().merge_lookup(lookup)
    }

    /// Overlay non-empty environment values on top of this configuration
    pub fn merge_env(self) -> Self {
        self.merge_lookup(|key| std::env::var(key).ok())
    }

    fn merge_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(email) = get(ENV_AUTH_EMAIL) {
            self.auth_email = Some(email);
        }
        if let Some(key) = get(ENV_AUTH_KEY) {
            self.auth_key = Some(key);
        }
        if let Some(account) = get(ENV_ACCOUNT_ID) {
            self.account_id = Some(account);
        }
        if let Some(zone) = get(ENV_ZONE_ID) {
            self.zone_id = Some(zone);
        }
        if let Some(proxy) = get(ENV_HTTPS_PROXY).or_else(|| get(ENV_HTTP_PROXY)) {
            self.proxy = Some(proxy);
        }
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_credentials(mut self, email: impl Into<String>, key: impl Into<String>) -> Self {
        self.auth_email = Some(email.into());
        self.auth_key = Some(key.into());
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_zone_id(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Default scope carried by this configuration
    pub fn default_scope(&self) -> Scope {
        Scope {
            account_id: self.account_id.clone(),
            zone_id: self.zone_id.clone(),
        }
    }
}

/// On-disk configuration file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cloudflare: CloudflareSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudflareSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl From<&ClientConfig> for ConfigFile {
    fn from(config: &ClientConfig) -> Self {
        let http = if config.base_url != DEFAULT_BASE_URL || config.proxy.is_some() {
            Some(HttpSection {
                base_url: Some(config.base_url.clone()).filter(|url| url != DEFAULT_BASE_URL),
                proxy: config.proxy.clone(),
            })
        } else {
            None
        };

        ConfigFile {
            cloudflare: CloudflareSection {
                auth_email: config.auth_email.clone(),
                auth_key: config.auth_key.clone(),
                account_id: config.account_id.clone(),
                zone_id: config.zone_id.clone(),
            },
            http,
        }
    }
}

/// Parse a config file from a path
pub fn parse_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a config file from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<ClientConfig> {
    let raw: ConfigFile = toml::from_str(content)?;
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let (base_url, proxy) = match raw.http {
        Some(http) => (non_empty(http.base_url), non_empty(http.proxy)),
        None => (None, None),
    };

    let base_url = match base_url {
        Some(url) => validate_base_url(&url)?,
        None => DEFAULT_BASE_URL.to_string(),
    };

    Ok(ClientConfig {
        base_url,
        auth_email: non_empty(raw.cloudflare.auth_email),
        auth_key: non_empty(raw.cloudflare.auth_key),
        account_id: non_empty(raw.cloudflare.account_id),
        zone_id: non_empty(raw.cloudflare.zone_id),
        proxy,
    })
}

/// Serialize a configuration in the file layout read by [`parse_config_str`]
pub fn render_config(config: &ClientConfig) -> Result<String> {
    toml::to_string_pretty(&ConfigFile::from(config)).map_err(|e| Error::Config(e.to_string()))
}

/// Base URLs must carry an explicit HTTP scheme; a trailing slash is dropped
/// because API paths always start with one.
fn validate_base_url(url: &str) -> Result<String> {
    let url = url.trim();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(Error::Config(format!(
            "base_url must start with http:// or https://: '{}'",
            url
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}
