//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod discovery;
mod remote_config;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenVerifier};
pub use discovery::{DiscoveryError, InstanceInfo, ServiceRegistry};
pub use remote_config::{ConfigSource, PropertySource, RemoteConfig, RemoteConfigError};
pub use repository::PostRepository;
