//! Service discovery port.

use std::collections::HashMap;

use async_trait::async_trait;

/// Describes this process to the discovery registry.
#[derive(Debug, Clone)]
pub struct InstanceInfo {
    pub app_id: String,
    pub host_name: String,
    pub ip_addr: String,
    pub port: u16,
    /// Seconds without a renewal before the registry evicts the instance.
    pub lease_duration_secs: u32,
    pub metadata: HashMap<String, String>,
}

impl InstanceInfo {
    pub fn new(
        app_id: impl Into<String>,
        host_name: impl Into<String>,
        ip_addr: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            host_name: host_name.into(),
            ip_addr: ip_addr.into(),
            port,
            lease_duration_secs: 90,
            metadata: HashMap::new(),
        }
    }

    /// Registry-unique instance id: `host:app:port`.
    pub fn instance_id(&self) -> String {
        format!("{}:{}:{}", self.host_name, self.app_id, self.port)
    }
}

#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    async fn register(&self, instance: &InstanceInfo) -> Result<(), DiscoveryError>;

    /// Renew the lease (heartbeat).
    async fn renew(&self, instance: &InstanceInfo) -> Result<(), DiscoveryError>;

    async fn deregister(&self, instance: &InstanceInfo) -> Result<(), DiscoveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Registry unavailable: {0}")]
    Unavailable(String),

    #[error("Registry rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Instance not known to registry")]
    NotRegistered,
}
