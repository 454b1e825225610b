use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostChanges};
use crate::error::RepoError;

/// Storage for posts.
///
/// Ids that are malformed for the backing store are treated as absent.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, in store order.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError>;

    /// Persist a new post. The store assigns the id.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Atomically patch an existing post, returning the updated document.
    async fn update(&self, id: &str, changes: PostChanges) -> Result<Option<Post>, RepoError>;

    /// Delete by id. Returns whether a document was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Insert a post under its own id unless that id is already taken.
    async fn insert_if_absent(&self, post: Post) -> Result<bool, RepoError>;
}
