//! Startup handshakes: registry registration, remote configuration and
//! token-key resolution. Every failure here is fatal.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use posts_core::error::RepoError;
use posts_core::ports::{
    ConfigSource, DiscoveryError, InstanceInfo, RemoteConfig, RemoteConfigError, ServiceRegistry,
    TokenVerifier,
};
use posts_infra::{JwtKey, JwtTokenVerifier};

use crate::config::{ConfigError, Profile};

/// Property holding the shared HS256 secret.
pub const JWT_SECRET_PROPERTY: &str = "security.oauth2.resource.jwt.keyValue";

/// Number of leading property sources searched for the secret.
const SECRET_SOURCE_DEPTH: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Registry registration failed: {0}")]
    RegistryUnavailable(#[from] DiscoveryError),

    #[error("Config server request failed: {0}")]
    ConfigServerUnavailable(#[from] RemoteConfigError),

    #[error("Auth key unavailable: {0}")]
    AuthKeyMissing(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Seeding default posts failed: {0}")]
    Seed(#[from] RepoError),

    #[error("Metrics registry setup failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Register this instance with the discovery registry.
pub async fn register_instance(
    registry: &dyn ServiceRegistry,
    instance: &InstanceInfo,
) -> Result<(), StartupError> {
    registry.register(instance).await?;

    tracing::info!(
        app_id = %instance.app_id,
        instance_id = %instance.instance_id(),
        ip = %instance.ip_addr,
        port = instance.port,
        "Registered with discovery registry"
    );
    Ok(())
}

/// Renew the registry lease every `every` until the task is aborted.
///
/// Failures are logged and retried on the next tick; an instance the registry
/// no longer knows is registered again.
pub fn spawn_lease_renewal(
    registry: Arc<dyn ServiceRegistry>,
    instance: InstanceInfo,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        loop {
            ticker.tick().await;

            match registry.renew(&instance).await {
                Ok(()) => tracing::trace!(instance_id = %instance.instance_id(), "Lease renewed"),
                Err(DiscoveryError::NotRegistered) => {
                    tracing::warn!("Registry lost this instance, registering again");
                    if let Err(e) = registry.register(&instance).await {
                        tracing::warn!(error = %e, "Re-registration failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Lease renewal failed"),
            }
        }
    })
}

/// Stop lease renewal and deregister, best-effort.
pub async fn leave_registry(
    registry: &dyn ServiceRegistry,
    instance: &InstanceInfo,
    heartbeat: JoinHandle<()>,
) {
    heartbeat.abort();

    match registry.deregister(instance).await {
        Ok(()) => tracing::info!(instance_id = %instance.instance_id(), "Left discovery registry"),
        Err(e) => tracing::warn!(error = %e, "Deregistration failed"),
    }
}

/// Fetch the configuration for `application` under the active profile.
pub async fn fetch_remote_config(
    source: &dyn ConfigSource,
    application: &str,
    profile: &Profile,
) -> Result<RemoteConfig, StartupError> {
    let config = source.fetch(application, profile.as_str()).await?;

    tracing::info!(
        application,
        profile = %profile.as_str(),
        version = config.version.as_deref().unwrap_or("unknown"),
        sources = config.property_sources.len(),
        "Remote configuration loaded"
    );
    Ok(config)
}

/// Choose the token key for the active profile.
///
/// Production verifies RS256 against the public key file; every other profile
/// verifies HS256 against the secret served by the config server.
pub fn resolve_jwt_key(
    profile: &Profile,
    remote: &RemoteConfig,
    public_key_path: Option<&Path>,
) -> Result<JwtKey, StartupError> {
    if profile.is_production() {
        let path = public_key_path
            .ok_or_else(|| StartupError::AuthKeyMissing("public key path not set".to_string()))?;
        let public_key_pem = std::fs::read(path).map_err(|e| {
            StartupError::AuthKeyMissing(format!("cannot read {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Using RS256 public key");
        return Ok(JwtKey::Asymmetric { public_key_pem });
    }

    let secret = remote
        .string_property(JWT_SECRET_PROPERTY, SECRET_SOURCE_DEPTH)
        .ok_or_else(|| StartupError::AuthKeyMissing("Not found secretKey".to_string()))?;

    tracing::info!("Using HS256 shared secret from remote configuration");
    Ok(JwtKey::Symmetric {
        secret: secret.to_string(),
    })
}

/// Build the verifier injected into the bearer-auth middleware.
pub fn build_verifier(key: &JwtKey) -> Result<Arc<dyn TokenVerifier>, StartupError> {
    let verifier =
        JwtTokenVerifier::new(key).map_err(|e| StartupError::AuthKeyMissing(e.to_string()))?;
    Ok(Arc::new(verifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PUBLIC_KEY_PATH: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../crates/posts-infra/fixtures/jwt_public.pem"
    );

    fn remote(sources: serde_json::Value) -> RemoteConfig {
        serde_json::from_value(serde_json::json!({ "propertySources": sources })).unwrap()
    }

    #[derive(Default)]
    struct RecordingRegistry {
        registered: AtomicUsize,
        renewed: AtomicUsize,
        deregistered: AtomicUsize,
        forget_on_renew: bool,
        fail_register: bool,
        fail_deregister: bool,
    }

    #[async_trait]
    impl ServiceRegistry for RecordingRegistry {
        async fn register(&self, _instance: &InstanceInfo) -> Result<(), DiscoveryError> {
            self.registered.fetch_add(1, Ordering::SeqCst);
            if self.fail_register {
                return Err(DiscoveryError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }

        async fn renew(&self, _instance: &InstanceInfo) -> Result<(), DiscoveryError> {
            self.renewed.fetch_add(1, Ordering::SeqCst);
            if self.forget_on_renew {
                return Err(DiscoveryError::NotRegistered);
            }
            Ok(())
        }

        async fn deregister(&self, _instance: &InstanceInfo) -> Result<(), DiscoveryError> {
            self.deregistered.fetch_add(1, Ordering::SeqCst);
            if self.fail_deregister {
                return Err(DiscoveryError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }
    }

    struct StaticConfigSource {
        requested: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ConfigSource for StaticConfigSource {
        async fn fetch(
            &self,
            application: &str,
            profile: &str,
        ) -> Result<RemoteConfig, RemoteConfigError> {
            self.requested
                .lock()
                .unwrap()
                .push((application.to_string(), profile.to_string()));
            Ok(RemoteConfig::default())
        }
    }

    fn instance() -> InstanceInfo {
        InstanceInfo::new("posts", "host", "127.0.0.1", 3006)
    }

    #[tokio::test]
    async fn test_register_instance_failure_is_fatal() {
        let registry = RecordingRegistry {
            fail_register: true,
            ..Default::default()
        };

        let err = register_instance(&registry, &instance()).await.unwrap_err();

        assert!(matches!(err, StartupError::RegistryUnavailable(_)));
    }

    #[tokio::test]
    async fn test_lease_renewal_reregisters_forgotten_instance() {
        let registry = Arc::new(RecordingRegistry {
            forget_on_renew: true,
            ..Default::default()
        });

        let handle = spawn_lease_renewal(registry.clone(), instance(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(registry.renewed.load(Ordering::SeqCst) >= 1);
        assert!(registry.registered.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_leave_registry_stops_renewal_and_deregisters() {
        let registry = Arc::new(RecordingRegistry::default());
        let handle = spawn_lease_renewal(registry.clone(), instance(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;

        leave_registry(registry.as_ref(), &instance(), handle).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let renewed = registry.renewed.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(registry.deregistered.load(Ordering::SeqCst), 1);
        assert_eq!(registry.renewed.load(Ordering::SeqCst), renewed);
    }

    #[tokio::test]
    async fn test_leave_registry_tolerates_deregistration_failure() {
        let registry = RecordingRegistry {
            fail_deregister: true,
            ..Default::default()
        };
        let handle = tokio::spawn(async {});

        leave_registry(&registry, &instance(), handle).await;

        assert_eq!(registry.deregistered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_remote_config_uses_app_and_profile() {
        let source = StaticConfigSource {
            requested: Mutex::new(Vec::new()),
        };

        fetch_remote_config(&source, "posts", &Profile::new("dev"))
            .await
            .unwrap();

        assert_eq!(
            *source.requested.lock().unwrap(),
            vec![("posts".to_string(), "dev".to_string())]
        );
    }

    #[test]
    fn test_non_production_uses_secret_from_first_source() {
        let config = remote(serde_json::json!([
            { "name": "posts-dev.yml", "source": { JWT_SECRET_PROPERTY: "first" } },
            { "name": "posts.yml", "source": { JWT_SECRET_PROPERTY: "second" } }
        ]));

        let key = resolve_jwt_key(&Profile::new("dev"), &config, None).unwrap();

        assert!(matches!(key, JwtKey::Symmetric { ref secret } if secret == "first"));
    }

    #[test]
    fn test_non_production_falls_back_to_second_source() {
        let config = remote(serde_json::json!([
            { "name": "posts-dev.yml", "source": {} },
            { "name": "posts.yml", "source": { JWT_SECRET_PROPERTY: "second" } }
        ]));

        let key = resolve_jwt_key(&Profile::new("dev"), &config, None).unwrap();

        assert!(matches!(key, JwtKey::Symmetric { ref secret } if secret == "second"));
    }

    #[test]
    fn test_non_production_without_secret_is_fatal() {
        let config = remote(serde_json::json!([{ "name": "posts.yml", "source": {} }]));

        let err = resolve_jwt_key(&Profile::new("dev"), &config, None).unwrap_err();

        assert!(matches!(err, StartupError::AuthKeyMissing(_)));
    }

    #[test]
    fn test_production_reads_public_key_file() {
        let config = remote(serde_json::json!([
            { "name": "posts.yml", "source": { JWT_SECRET_PROPERTY: "ignored" } }
        ]));

        let key = resolve_jwt_key(
            &Profile::new("prod"),
            &config,
            Some(Path::new(PUBLIC_KEY_PATH)),
        )
        .unwrap();

        assert!(matches!(key, JwtKey::Asymmetric { .. }));
        assert!(build_verifier(&key).is_ok());
    }

    #[test]
    fn test_production_missing_key_file_is_fatal() {
        let err = resolve_jwt_key(
            &Profile::new("prod"),
            &RemoteConfig::default(),
            Some(Path::new("/nonexistent/public.pem")),
        )
        .unwrap_err();

        assert!(matches!(err, StartupError::AuthKeyMissing(_)));
    }

    #[test]
    fn test_unparseable_public_key_is_fatal() {
        let key = JwtKey::Asymmetric {
            public_key_pem: b"-----BEGIN PUBLIC KEY-----\ngarbage\n".to_vec(),
        };

        assert!(matches!(
            build_verifier(&key),
            Err(StartupError::AuthKeyMissing(_))
        ));
    }
}
