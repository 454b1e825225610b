//! Spring Cloud Config client (`GET /{application}/{profile}`).

use std::time::Duration;

use async_trait::async_trait;

use posts_core::ports::{ConfigSource, RemoteConfig, RemoteConfigError};

/// Query parameter carrying the key the config server decrypts secrets with.
pub const ENCRYPT_KEY_PARAM: &str = "X-Encrypt-Key";

#[derive(Debug, Clone)]
pub struct SpringConfigClientConfig {
    pub base_url: String,
    pub encrypt_key: Option<String>,
    pub timeout: Duration,
}

impl SpringConfigClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            encrypt_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_encrypt_key(mut self, key: impl Into<String>) -> Self {
        self.encrypt_key = Some(key.into());
        self
    }
}

/// Fetches profile-scoped configuration from a config server.
pub struct SpringConfigClient {
    client: reqwest::Client,
    config: SpringConfigClientConfig,
}

impl SpringConfigClient {
    pub fn new(config: SpringConfigClientConfig) -> Result<Self, RemoteConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteConfigError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ConfigSource for SpringConfigClient {
    async fn fetch(
        &self,
        application: &str,
        profile: &str,
    ) -> Result<RemoteConfig, RemoteConfigError> {
        let url = format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            application,
            profile
        );
        tracing::debug!(%url, "Fetching remote configuration");

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.config.encrypt_key {
            request = request.query(&[(ENCRYPT_KEY_PARAM, key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteConfigError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteConfigError::Status(status.as_u16()));
        }

        response
            .json::<RemoteConfig>()
            .await
            .map_err(|e| RemoteConfigError::Malformed(e.to_string()))
    }
}
