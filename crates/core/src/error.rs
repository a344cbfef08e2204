use thiserror::Error;

use crate::types::ApiMessage;

#[derive(Debug, Error)]
pub enum Error {
    /// No account or zone identifier could be resolved for the call
    #[error("You must provide {0}")]
    MissingScope(&'static str),

    /// A required argument was absent or empty
    #[error("You must provide {0}")]
    MissingArgument(&'static str),

    /// Name-to-id resolution found no match
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The API answered with an unsuccessful envelope where a payload was required
    #[error("Cloudflare API error: {}", describe(.errors))]
    Rejected { errors: Vec<ApiMessage> },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures raised by local validation, before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingScope(_) | Error::MissingArgument(_) | Error::InvalidArgument(_)
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

fn describe(errors: &[ApiMessage]) -> String {
    match errors.first() {
        Some(first) => format!("{} (code {})", first.message, first.code),
        None => "Unknown Cloudflare API error".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
