use std::time::Duration;

use tracing::debug;

use crate::collect::collect;
use crate::errors::HydrateError;
use crate::node::{HydrateNode, NodeRef};
use crate::provider::{Provider, SecretsProvider};
use crate::replace::replace;
use crate::resolve::resolve;

/// Per-call tuning for the fetch phase.
#[derive(Debug, Clone, Default)]
pub struct HydrateOptions {
    fetch_timeout: Option<Duration>,
}

impl HydrateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every fetch; a fetch exceeding the limit resolves to a timeout
    /// outcome for its key instead of stalling the call.
    pub fn fetch_timeout(mut self, limit: Duration) -> Self {
        self.fetch_timeout = Some(limit);
        self
    }
}

/// Recursively walks `config` and hydrates all string leaves matching the
/// `$SECRET:` prefix using the backend named by `selector`.
///
/// Placeholder values have the format `$SECRET:{key}`.
///
/// Supported selectors:
/// - `"gcp"`: Google Secret Manager (requires the `gcp` feature)
/// - `"env"`: process environment variables (requires the `env` feature)
/// - `""` / `"none"`: no backend configured; the call fails on any
///   placeholder found
pub async fn hydrate<T>(selector: &str, config: &mut T) -> Result<(), HydrateError>
where
    T: HydrateNode,
{
    let provider = selector.parse::<Provider>()?.build()?;
    hydrate_with(provider.as_ref(), config, &HydrateOptions::default()).await
}

/// Dependency-injected form of [`hydrate`]: drives collection, resolution,
/// and replacement against the supplied fetch capability.
///
/// Each distinct key is fetched exactly once, no matter how many leaves
/// reference it. On failure the graph holds every leaf whose key resolved
/// and keeps the placeholder for every leaf whose key did not; any error
/// return means the configuration must not be used.
pub async fn hydrate_with<T>(
    provider: &dyn SecretsProvider,
    config: &mut T,
    options: &HydrateOptions,
) -> Result<(), HydrateError>
where
    T: HydrateNode,
{
    validate_root(&*config)?;

    let keys = collect(&*config)?;
    if keys.is_empty() {
        debug!("no placeholders found, nothing to hydrate");
        return Ok(());
    }
    debug!(keys = keys.len(), "collected distinct secret keys");

    let outcomes = resolve(provider, &keys, options.fetch_timeout).await;

    replace(config, &outcomes)
}

fn validate_root(root: &dyn HydrateNode) -> Result<(), HydrateError> {
    match root.node_ref() {
        NodeRef::Record(_) => Ok(()),
        NodeRef::Optional(Some(inner)) => validate_root(inner),
        NodeRef::Optional(None) => Err(HydrateError::InvalidInput {
            kind: "absent optional",
        }),
        other => Err(HydrateError::InvalidInput {
            kind: other.kind_name(),
        }),
    }
}
