//! # Posts Infrastructure
//!
//! Concrete implementations of the ports defined in `posts-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory repository only
//! - `mongo` - MongoDB post repository
//! - `auth` - JWT bearer-token verification
//! - `cloud` - Eureka registry and Spring Cloud Config clients

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "cloud")]
pub mod discovery;

#[cfg(feature = "cloud")]
pub mod remote_config;

// Re-exports - In-Memory
pub use database::InMemoryPostRepository;

#[cfg(feature = "mongo")]
pub use database::{MongoConfig, MongoConnection, MongoPostRepository};

#[cfg(feature = "auth")]
pub use auth::{JwtKey, JwtTokenVerifier};

#[cfg(feature = "cloud")]
pub use discovery::{EurekaClient, EurekaConfig};

#[cfg(feature = "cloud")]
pub use remote_config::{SpringConfigClient, SpringConfigClientConfig};
