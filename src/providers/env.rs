use async_trait::async_trait;

use crate::errors::FetchError;
use crate::provider::SecretsProvider;

/// Read-only backend that resolves keys from process environment
/// variables.
#[derive(Debug, Default, Clone)]
pub struct EnvProvider {
    prefix: Option<String>,
}

impl EnvProvider {
    /// Resolve each key as the environment variable of the same name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every key before the environment lookup.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn var_name(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl SecretsProvider for EnvProvider {
    async fn fetch_secret(&self, key: &str) -> Result<String, FetchError> {
        match std::env::var(self.var_name(key)) {
            Ok(value) => Ok(value),
            Err(std::env::VarError::NotPresent) => Err(FetchError::NotFound(key.to_string())),
            Err(err) => Err(FetchError::Backend(err.to_string())),
        }
    }
}
