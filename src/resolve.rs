use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::errors::FetchError;
use crate::provider::SecretsProvider;

/// Value-or-failure outcome per distinct key, fully populated before the
/// replace pass reads it.
pub(crate) type Outcomes = HashMap<String, std::result::Result<String, FetchError>>;

/// Fetches every distinct key concurrently, one task per key, and joins at
/// a single barrier.
///
/// A failing fetch never cancels its siblings: exhausting all fetches
/// surfaces every missing secret in one call. With a `fetch_timeout`, a
/// fetch exceeding the limit resolves to a [`FetchError::TimedOut`] outcome
/// for its key instead of stalling the barrier.
pub(crate) async fn resolve(
    provider: &dyn SecretsProvider,
    keys: &BTreeSet<String>,
    fetch_timeout: Option<Duration>,
) -> Outcomes {
    let fetches = keys.iter().map(|key| async move {
        let outcome = fetch_one(provider, key, fetch_timeout).await;
        (key.clone(), outcome)
    });

    join_all(fetches).await.into_iter().collect()
}

async fn fetch_one(
    provider: &dyn SecretsProvider,
    key: &str,
    fetch_timeout: Option<Duration>,
) -> std::result::Result<String, FetchError> {
    let outcome = match fetch_timeout {
        Some(limit) => match tokio::time::timeout(limit, provider.fetch_secret(key)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::TimedOut {
                key: key.to_string(),
                limit,
            }),
        },
        None => provider.fetch_secret(key).await,
    };

    match &outcome {
        Ok(_) => debug!(key, "fetched secret"),
        Err(cause) => warn!(key, %cause, "fetching secret failed"),
    }

    outcome
}
