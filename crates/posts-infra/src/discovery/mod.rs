//! Service discovery clients.

mod eureka;

pub use eureka::{EurekaClient, EurekaConfig};
