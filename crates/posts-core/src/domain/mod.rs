//! Domain entities - the core business objects.

mod post;
pub mod seed;

pub use post::{NewPost, Post, PostChanges};
