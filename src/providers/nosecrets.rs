use async_trait::async_trait;

use crate::errors::FetchError;
use crate::provider::SecretsProvider;

/// Default backend that fails on fetching any placeholder.
///
/// Used to assert that an environment genuinely has no secrets to resolve:
/// hydrating a placeholder-free graph with it succeeds, anything else
/// fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecretsProvider;

impl NoSecretsProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecretsProvider for NoSecretsProvider {
    async fn fetch_secret(&self, _key: &str) -> Result<String, FetchError> {
        Err(FetchError::NoProvider)
    }
}
