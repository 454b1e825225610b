//! Authentication implementations.

mod jwt;

pub use jwt::{JwtKey, JwtTokenVerifier};
