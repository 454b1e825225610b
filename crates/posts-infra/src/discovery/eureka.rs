//! Eureka REST client (`/apps/{app}` registration protocol).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use posts_core::ports::{DiscoveryError, InstanceInfo, ServiceRegistry};

/// Eureka client configuration.
#[derive(Debug, Clone)]
pub struct EurekaConfig {
    /// Registry base URL, e.g. `http://eureka:8761/eureka`.
    pub base_url: String,
    pub timeout: Duration,
    /// Advertised lease renewal interval.
    pub renewal_interval: Duration,
}

impl EurekaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            renewal_interval: Duration::from_secs(30),
        }
    }
}

/// Registers and renews this instance with a Eureka server.
pub struct EurekaClient {
    client: reqwest::Client,
    config: EurekaConfig,
}

impl EurekaClient {
    pub fn new(config: EurekaConfig) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn app_url(&self, instance: &InstanceInfo) -> String {
        format!(
            "{}/apps/{}",
            self.config.base_url.trim_end_matches('/'),
            instance.app_id
        )
    }

    fn instance_url(&self, instance: &InstanceInfo) -> String {
        format!("{}/{}", self.app_url(instance), instance.instance_id())
    }

    /// Registration payload in Eureka's JSON dialect.
    fn registration_body(&self, instance: &InstanceInfo) -> Value {
        let base = format!("http://{}:{}", instance.host_name, instance.port);
        let vip = instance.app_id.to_lowercase();

        json!({
            "instance": {
                "instanceId": instance.instance_id(),
                "hostName": instance.host_name,
                "app": instance.app_id.to_uppercase(),
                "ipAddr": instance.ip_addr,
                "vipAddress": vip,
                "secureVipAddress": vip,
                "status": "UP",
                "port": { "$": instance.port, "@enabled": "true" },
                "securePort": { "$": 443, "@enabled": "false" },
                "homePageUrl": format!("{base}/"),
                "statusPageUrl": format!("{base}/actuator/info"),
                "healthCheckUrl": format!("{base}/actuator/health"),
                "dataCenterInfo": {
                    "@class": "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo",
                    "name": "MyOwn"
                },
                "leaseInfo": {
                    "renewalIntervalInSecs": self.config.renewal_interval.as_secs(),
                    "durationInSecs": instance.lease_duration_secs
                },
                "metadata": instance.metadata,
            }
        })
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), DiscoveryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(DiscoveryError::NotRegistered);
    }

    let body = response.text().await.unwrap_or_default();
    Err(DiscoveryError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ServiceRegistry for EurekaClient {
    async fn register(&self, instance: &InstanceInfo) -> Result<(), DiscoveryError> {
        let url = self.app_url(instance);
        tracing::debug!(%url, instance_id = %instance.instance_id(), "Registering instance");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&self.registration_body(instance))
            .send()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        check_status(response).await
    }

    async fn renew(&self, instance: &InstanceInfo) -> Result<(), DiscoveryError> {
        let response = self
            .client
            .put(self.instance_url(instance))
            .send()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        check_status(response).await
    }

    async fn deregister(&self, instance: &InstanceInfo) -> Result<(), DiscoveryError> {
        let response = self
            .client
            .delete(self.instance_url(instance))
            .send()
            .await
            .map_err(|e| DiscoveryError::Unavailable(e.to_string()))?;

        check_status(response).await
    }
}
