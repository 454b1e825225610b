//! # Posts Core
//!
//! The domain layer of the posts service.
//! This crate contains the `Post` model, the error taxonomy and the ports that
//! infrastructure adapters implement. It carries no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
