//! MongoDB post repository.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{DateTime, doc};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use posts_core::domain::{NewPost, Post, PostChanges};
use posts_core::error::RepoError;
use posts_core::ports::PostRepository;

use super::entity::post::{COLLECTION, PostDocument, parse_object_id};

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed post repository over the `posts` collection.
#[derive(Clone)]
pub struct MongoPostRepository {
    collection: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

fn repo_error(e: mongodb::error::Error) -> RepoError {
    match e.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            RepoError::Connection(e.to_string())
        }
        _ => RepoError::Query(e.to_string()),
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let cursor = self.collection.find(doc! {}).await.map_err(repo_error)?;
        let documents: Vec<PostDocument> = cursor.try_collect().await.map_err(repo_error)?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, RepoError> {
        let Some(oid) = parse_object_id(id) else {
            tracing::debug!(post_id = %id, "Malformed post id");
            return Ok(None);
        };

        let result = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, post: NewPost) -> Result<Post, RepoError> {
        let document = PostDocument::from_new(ObjectId::new(), post);

        self.collection.insert_one(&document).await.map_err(|e| {
            if is_duplicate_key(&e) {
                RepoError::Constraint("Post already exists".to_string())
            } else {
                repo_error(e)
            }
        })?;

        Ok(document.into())
    }

    async fn update(&self, id: &str, changes: PostChanges) -> Result<Option<Post>, RepoError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        // Only patch what changed; creation fields are never part of `$set`.
        let mut set = doc! {
            "lastmodifieddate": DateTime::from_chrono(changes.last_modified_date),
            "lastmodifiedbyuser": changes.last_modified_by_user,
        };
        if let Some(name) = changes.name {
            set.insert("name", name);
        }

        let result = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, RepoError> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };

        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(repo_error)?;

        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(repo_error)
    }

    async fn insert_if_absent(&self, post: Post) -> Result<bool, RepoError> {
        let oid = ObjectId::parse_str(&post.id)
            .map_err(|e| RepoError::Query(format!("invalid post id {}: {}", post.id, e)))?;

        let document = PostDocument {
            id: oid,
            name: post.name,
            created_date: DateTime::from_chrono(post.created_date),
            last_modified_date: post.last_modified_date.map(DateTime::from_chrono),
            created_by_user: post.created_by_user,
            last_modified_by_user: post.last_modified_by_user,
        };

        match self.collection.insert_one(&document).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => {
                tracing::debug!(post_id = %oid, "Post already present, skipping");
                Ok(false)
            }
            Err(e) => Err(repo_error(e)),
        }
    }
}

// Live-server tests: `MONGODB_URI=mongodb://localhost:27017 cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MongoConfig, MongoConnection};
    use posts_core::domain::seed::{default_posts, seed_default_posts};

    async fn scratch_repo() -> (MongoPostRepository, Database) {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = MongoConfig {
            uri,
            database: format!("posts_test_{}", uuid::Uuid::new_v4().simple()),
            app_name: None,
        };

        let connection = MongoConnection::init(&config).await.unwrap();
        (
            MongoPostRepository::new(&connection.database),
            connection.database,
        )
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_update_preserves_creation_fields() {
        let (repo, db) = scratch_repo().await;
        let created = repo.insert(NewPost::new("before", "author")).await.unwrap();

        let updated = repo
            .update(&created.id, PostChanges::new(Some("after".to_string()), "editor"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "after");
        assert_eq!(updated.created_by_user, "author");
        assert_eq!(updated.created_date, created.created_date);
        assert_eq!(updated.last_modified_by_user, "editor");
        assert!(updated.last_modified_date.is_some());

        let stored = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_update_without_name_keeps_name() {
        let (repo, db) = scratch_repo().await;
        let created = repo.insert(NewPost::new("kept", "author")).await.unwrap();

        let updated = repo
            .update(&created.id, PostChanges::new(None, "editor"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "kept");
        assert_eq!(updated.last_modified_by_user, "editor");

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_zero_and_malformed_ids_are_unknown() {
        let (repo, db) = scratch_repo().await;
        repo.insert(NewPost::new("present", "u1")).await.unwrap();

        for id in ["000000000000000000000000", "garbage", "5eed000000000000000000ff"] {
            assert!(repo.find_by_id(id).await.unwrap().is_none());
            assert!(
                repo.update(id, PostChanges::new(None, "u1"))
                    .await
                    .unwrap()
                    .is_none()
            );
            assert!(!repo.delete_by_id(id).await.unwrap());
        }
        assert_eq!(repo.count().await.unwrap(), 1);

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_seeding_twice_inserts_once() {
        let (repo, db) = scratch_repo().await;

        assert_eq!(seed_default_posts(&repo).await.unwrap(), 2);
        assert_eq!(seed_default_posts(&repo).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 2);

        // A racing instance hits the unique `_id` index.
        let first = default_posts().remove(0);
        assert!(!repo.insert_if_absent(first).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 2);

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_delete_reports_whether_removed() {
        let (repo, db) = scratch_repo().await;
        let post = repo.insert(NewPost::new("gone", "u1")).await.unwrap();

        assert!(repo.delete_by_id(&post.id).await.unwrap());
        assert!(!repo.delete_by_id(&post.id).await.unwrap());
        assert!(repo.find_all().await.unwrap().is_empty());

        db.drop().await.unwrap();
    }
}
