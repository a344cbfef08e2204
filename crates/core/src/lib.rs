pub mod config;
pub mod error;
pub mod ident;
pub mod types;

pub use config::{ClientConfig, DEFAULT_BASE_URL, parse_config, parse_config_str};
pub use error::{Error, Result};
pub use ident::is_canonical_id;
pub use types::*;
