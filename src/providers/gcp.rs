//! Google Secret Manager backend over HTTPS.
//!
//! Talks to the Secret Manager REST API using a bearer token supplied via
//! environment variables. Each key resolves to the `latest` version of the
//! secret with the same name; payloads arrive base64-encoded and must be
//! valid UTF-8.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::errors::{FetchError, HydrateError};
use crate::provider::SecretsProvider;

const SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Google Secret Manager provider.
pub struct GcpProvider {
    project: String,
    access_token: String,
    endpoint: String,
    client: Client,
}

impl GcpProvider {
    /// Construct the provider from environment configuration.
    ///
    /// * `GCP_PROJECT` (or `GOOGLE_CLOUD_PROJECT`) names the project.
    /// * `GCP_ACCESS_TOKEN` (or `GOOGLE_OAUTH_ACCESS_TOKEN`) supplies the
    ///   bearer token.
    /// * `CLOUDSECRETS_GCP_ENDPOINT` overrides the Secret Manager endpoint.
    /// * `CLOUDSECRETS_GCP_TIMEOUT_SECS` sets the per-request timeout
    ///   (default 10s).
    pub fn from_env() -> Result<Self, HydrateError> {
        let project = env::var("GCP_PROJECT")
            .or_else(|_| env::var("GOOGLE_CLOUD_PROJECT"))
            .map_err(|_| init_error("set GCP_PROJECT or GOOGLE_CLOUD_PROJECT with the project id"))?;

        let access_token = env::var("GCP_ACCESS_TOKEN")
            .or_else(|_| env::var("GOOGLE_OAUTH_ACCESS_TOKEN"))
            .map_err(|_| {
                init_error("set GCP_ACCESS_TOKEN (or GOOGLE_OAUTH_ACCESS_TOKEN) with a valid bearer token")
            })?;

        let endpoint = env::var("CLOUDSECRETS_GCP_ENDPOINT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| SECRET_MANAGER_ENDPOINT.to_string());

        let timeout = env::var("CLOUDSECRETS_GCP_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self::new(project, access_token, endpoint, timeout)
    }

    /// Construct the provider with explicit settings.
    pub fn new(
        project: impl Into<String>,
        access_token: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HydrateError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| init_error(&err.to_string()))?;

        Ok(Self {
            project: project.into(),
            access_token: access_token.into(),
            endpoint: endpoint.into(),
            client,
        })
    }

    fn access_url(&self, key: &str) -> String {
        format!(
            "{}/projects/{}/secrets/{}/versions/latest:access",
            self.endpoint, self.project, key
        )
    }
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: AccessPayload,
}

#[derive(Deserialize)]
struct AccessPayload {
    data: String,
}

#[async_trait]
impl SecretsProvider for GcpProvider {
    async fn fetch_secret(&self, key: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.access_url(key))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|err| FetchError::Backend(format!("accessing secret {key:?}: {err}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound(key.to_string())),
            status if !status.is_success() => {
                return Err(FetchError::Backend(format!(
                    "accessing secret {key:?}: http {status}"
                )));
            }
            _ => {}
        }

        let body: AccessResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Backend(format!("decoding secret response: {err}")))?;

        let bytes = STANDARD
            .decode(body.payload.data.as_bytes())
            .map_err(|err| FetchError::Backend(format!("decoding secret payload: {err}")))?;

        String::from_utf8(bytes)
            .map_err(|err| FetchError::Backend(format!("secret payload is not utf-8: {err}")))
    }
}

fn init_error(reason: &str) -> HydrateError {
    HydrateError::ProviderInit {
        name: "gcp",
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::GcpProvider;
    use std::time::Duration;

    #[test]
    fn builds_access_url_with_latest_version() {
        let provider = GcpProvider::new(
            "my-project",
            "token",
            "https://sm.example.com/v1",
            Duration::from_secs(5),
        )
        .expect("provider");

        assert_eq!(
            provider.access_url("db-password"),
            "https://sm.example.com/v1/projects/my-project/secrets/db-password/versions/latest:access"
        );
    }
}
