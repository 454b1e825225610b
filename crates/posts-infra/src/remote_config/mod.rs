//! Centralized configuration clients.

mod spring;

pub use spring::{SpringConfigClient, SpringConfigClientConfig};
