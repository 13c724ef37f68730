use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::provider::SecretsProvider;

/// In-memory backend for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    secrets: HashMap<String, String>,
}

impl MemoryProvider {
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }

    /// Insert or replace a secret.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryProvider
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            secrets: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl SecretsProvider for MemoryProvider {
    async fn fetch_secret(&self, key: &str) -> Result<String, FetchError> {
        self.secrets
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(key.to_string()))
    }
}
