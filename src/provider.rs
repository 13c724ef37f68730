use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::errors::{FetchError, HydrateError};
use crate::providers::NoSecretsProvider;

/// Single-key fetch capability implemented by secret backends.
///
/// No bulk or versioning contract; a backend may resolve "latest version"
/// internally. This is the only interface the engine consumes.
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Fetch the value for one secret key.
    async fn fetch_secret(&self, key: &str) -> Result<String, FetchError>;
}

/// Backends selectable by name through [`hydrate`](crate::hydrate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// No backend configured; any placeholder is an error.
    NoSecrets,
    /// Process environment variables.
    Env,
    /// Google Secret Manager.
    Gcp,
}

impl Provider {
    /// Returns the static string identifier for the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::NoSecrets => "none",
            Provider::Env => "env",
            Provider::Gcp => "gcp",
        }
    }

    /// Construct the backend this selector names.
    pub fn build(&self) -> Result<Box<dyn SecretsProvider>, HydrateError> {
        match self {
            Provider::NoSecrets => Ok(Box::new(NoSecretsProvider::new())),
            #[cfg(feature = "env")]
            Provider::Env => Ok(Box::new(crate::providers::EnvProvider::new())),
            #[cfg(not(feature = "env"))]
            Provider::Env => Err(HydrateError::ProviderUnavailable {
                name: "env",
                feature: "env",
            }),
            #[cfg(feature = "gcp")]
            Provider::Gcp => Ok(Box::new(crate::providers::GcpProvider::from_env()?)),
            #[cfg(not(feature = "gcp"))]
            Provider::Gcp => Err(HydrateError::ProviderUnavailable {
                name: "gcp",
                feature: "gcp",
            }),
        }
    }
}

impl FromStr for Provider {
    type Err = HydrateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" | "none" => Ok(Provider::NoSecrets),
            "env" => Ok(Provider::Env),
            "gcp" => Ok(Provider::Gcp),
            _ => Err(HydrateError::UnknownProvider(value.trim().to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Provider;
    use crate::errors::HydrateError;

    #[test]
    fn parses_known_selectors() {
        assert_eq!("".parse::<Provider>().unwrap(), Provider::NoSecrets);
        assert_eq!("none".parse::<Provider>().unwrap(), Provider::NoSecrets);
        assert_eq!(" env ".parse::<Provider>().unwrap(), Provider::Env);
        assert_eq!("GCP".parse::<Provider>().unwrap(), Provider::Gcp);
    }

    #[test]
    fn rejects_unknown_selectors() {
        let error = "vault".parse::<Provider>().unwrap_err();
        match error {
            HydrateError::UnknownProvider(name) => assert_eq!(name, "vault"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
