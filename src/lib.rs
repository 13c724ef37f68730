//! Hydrates `$SECRET:` placeholders inside configuration graphs from a
//! pluggable secrets backend.
//!
//! A hydrate call walks a caller-owned configuration value, collects the
//! distinct set of secret keys referenced by string leaves starting with
//! [`SECRET_PREFIX`], concurrently fetches each key exactly once
//! through a [`SecretsProvider`], and walks the graph a second time to
//! write the resolved values in place. Every failure is reported together
//! in one aggregate error; any error return means the configuration must
//! not be used.
//!
//! Container types (`Option`, `Box`, `Vec`, string-keyed maps,
//! `serde_json::Value`) traverse out of the box; record types opt in with
//! the [`hydrate_record!`] macro.
//!
//! ```
//! use cloudsecrets::{HydrateOptions, MemoryProvider, hydrate_record, hydrate_with};
//!
//! #[derive(Debug, Default)]
//! struct Config {
//!     host: String,
//!     password: String,
//! }
//!
//! hydrate_record!(Config { host, password });
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let provider: MemoryProvider = [("db-password", "p@ss")].into_iter().collect();
//! let mut config = Config {
//!     host: "localhost:5432".to_string(),
//!     password: "$SECRET:db-password".to_string(),
//! };
//!
//! hydrate_with(&provider, &mut config, &HydrateOptions::new())
//!     .await
//!     .expect("hydrate");
//! assert_eq!(config.password, "p@ss");
//! # });
//! ```

mod collect;
mod hydrate;
mod json;
mod path;
mod replace;
mod resolve;
mod rt;
mod walk;

pub mod errors;
pub mod node;
pub mod provider;
pub mod providers;

pub use errors::{AggregateError, Diagnostic, DiagnosticCause, FetchError, HydrateError, Result};
pub use hydrate::{HydrateOptions, hydrate, hydrate_with};
pub use node::{FieldMut, FieldRef, HydrateNode, MapNode, NodeMut, NodeRef, SECRET_PREFIX};
pub use provider::{Provider, SecretsProvider};
#[cfg(feature = "env")]
pub use providers::EnvProvider;
#[cfg(feature = "gcp")]
pub use providers::GcpProvider;
pub use providers::{MemoryProvider, NoSecretsProvider};
pub use rt::hydrate_blocking;
