//! BSON document shapes.

pub mod post;
