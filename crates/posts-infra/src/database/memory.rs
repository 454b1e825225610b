//! In-memory post repository - used by tests and local wiring without MongoDB.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use posts_core::domain::{NewPost, Post, PostChanges};
use posts_core::error::RepoError;
use posts_core::ports::PostRepository;

/// Posts kept in insertion order behind an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.store.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let post = post.into_post(Uuid::new_v4().simple().to_string());
        self.store.write().await.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: &str, changes: PostChanges) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        let Some(post) = store.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.apply(changes);
        Ok(Some(post.clone()))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|p| p.id != id);
        Ok(store.len() < before)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.read().await.len() as u64)
    }

    async fn insert_if_absent(&self, post: Post) -> Result<bool, RepoError> {
        // Check and push under one write guard.
        let mut store = self.store.write().await;
        if store.iter().any(|p| p.id == post.id) {
            return Ok(false);
        }
        store.push(post);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posts_core::domain::seed::{SEED_USER, seed_default_posts};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let repo = InMemoryPostRepository::new();

        let mut ids = HashSet::new();
        for i in 0..20 {
            let post = repo.insert(NewPost::new(format!("post {i}"), "u1")).await.unwrap();
            assert!(!post.id.is_empty());
            ids.insert(post.id);
        }

        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let repo = InMemoryPostRepository::new();
        repo.insert(NewPost::new("first", "u1")).await.unwrap();
        repo.insert(NewPost::new("second", "u1")).await.unwrap();

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = InMemoryPostRepository::new();

        let result = repo
            .update("missing", PostChanges::new(Some("x".to_string()), "u1"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = InMemoryPostRepository::new();
        let post = repo.insert(NewPost::new("gone", "u1")).await.unwrap();

        assert!(repo.delete_by_id(&post.id).await.unwrap());
        assert!(!repo.delete_by_id(&post.id).await.unwrap());
        assert!(repo.find_by_id(&post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_empty_store_inserts_two_defaults() {
        let repo = InMemoryPostRepository::new();

        let inserted = seed_default_posts(&repo).await.unwrap();

        assert_eq!(inserted, 2);
        let posts = repo.find_all().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.created_by_user == SEED_USER));
        assert!(posts.iter().all(|p| p.last_modified_by_user.is_empty()));
    }

    #[tokio::test]
    async fn test_seed_non_empty_store_inserts_nothing() {
        let repo = InMemoryPostRepository::new();
        seed_default_posts(&repo).await.unwrap();

        let inserted = seed_default_posts(&repo).await.unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seed_skips_store_with_user_data() {
        let repo = InMemoryPostRepository::new();
        repo.insert(NewPost::new("mine", "u1")).await.unwrap();

        assert_eq!(seed_default_posts(&repo).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_seeding_does_not_duplicate() {
        let repo = std::sync::Arc::new(InMemoryPostRepository::new());

        let (a, b) = tokio::join!(seed_default_posts(&*repo), seed_default_posts(&*repo));

        assert_eq!(a.unwrap() + b.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
