//! Post storage - MongoDB and in-memory implementations.

mod memory;

#[cfg(feature = "mongo")]
mod connections;
#[cfg(feature = "mongo")]
pub mod entity;
#[cfg(feature = "mongo")]
mod mongo_repo;

pub use memory::InMemoryPostRepository;

#[cfg(feature = "mongo")]
pub use connections::{MongoConfig, MongoConnection};
#[cfg(feature = "mongo")]
pub use mongo_repo::MongoPostRepository;
