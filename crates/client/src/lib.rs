//! Client for the Cloudflare Workers and Workers KV REST API.
//!
//! ```no_run
//! use workers_kit_client::{Client, Outcome};
//! use workers_kit_core::{ClientConfig, Scope};
//!
//! # async fn run() -> workers_kit_core::Result<()> {
//! let client = Client::new(ClientConfig::from_env())?;
//! client.set_account_id("023e105f4ecef8ad9ca31a8372d0c353");
//!
//! if let Outcome::Unwrapped(namespaces) = client.list_namespaces(&Scope::default()).await? {
//!     for namespace in namespaces {
//!         println!("{} {}", namespace.id, namespace.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Reads and listings return [`Outcome`]: the unwrapped `result` when the API
//! reports success, otherwise the raw [`Envelope`](workers_kit_core::Envelope).
//! Mutations return the envelope as sent. Local problems (missing scope or
//! arguments, unknown namespace title, transport failures) are errors.

pub mod client;
pub mod envelope;
pub mod resolver;
mod storage;
pub mod transport;
pub mod workers;

#[cfg(test)]
mod testing;

pub use client::Client;
pub use envelope::{Outcome, is_duplicate_namespace_error};
pub use transport::{ApiRequest, FormPart, HttpTransport, RequestBody, Transport};
pub use workers::ScriptDeploy;
