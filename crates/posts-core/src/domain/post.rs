use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - the single resource managed by the service.
///
/// `id` is assigned by the store on insert and never changes afterwards.
/// `created_date` and `created_by_user` are written once; the `last_modified_*`
/// pair stays empty until the first update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub name: String,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub created_by_user: String,
    pub last_modified_by_user: String,
}

impl Post {
    /// Apply a field-level patch. Creation fields are left untouched.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        self.last_modified_date = Some(changes.last_modified_date);
        self.last_modified_by_user = changes.last_modified_by_user;
    }
}

/// A post that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub name: String,
    pub created_date: DateTime<Utc>,
    pub created_by_user: String,
}

impl NewPost {
    /// Create a new post stamped with the current time.
    pub fn new(name: impl Into<String>, created_by_user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_date: Utc::now(),
            created_by_user: created_by_user.into(),
        }
    }

    /// Attach a store-assigned id.
    pub fn into_post(self, id: String) -> Post {
        Post {
            id,
            name: self.name,
            created_date: self.created_date,
            last_modified_date: None,
            created_by_user: self.created_by_user,
            last_modified_by_user: String::new(),
        }
    }
}

/// Partial update of a post.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub name: Option<String>,
    pub last_modified_date: DateTime<Utc>,
    pub last_modified_by_user: String,
}

impl PostChanges {
    pub fn new(name: Option<String>, modified_by: impl Into<String>) -> Self {
        Self {
            name,
            last_modified_date: Utc::now(),
            last_modified_by_user: modified_by.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_has_empty_modification_fields() {
        let post = NewPost::new("X", "u1").into_post("abc".to_string());

        assert_eq!(post.id, "abc");
        assert_eq!(post.created_by_user, "u1");
        assert_eq!(post.last_modified_by_user, "");
        assert!(post.last_modified_date.is_none());
    }

    #[test]
    fn test_apply_preserves_creation_fields() {
        let mut post = NewPost::new("before", "author").into_post("abc".to_string());
        let created = post.created_date;

        post.apply(PostChanges::new(Some("after".to_string()), "editor"));

        assert_eq!(post.name, "after");
        assert_eq!(post.created_by_user, "author");
        assert_eq!(post.created_date, created);
        assert_eq!(post.last_modified_by_user, "editor");
        assert!(post.last_modified_date.is_some());
    }

    #[test]
    fn test_apply_without_name_keeps_name() {
        let mut post = NewPost::new("keep", "author").into_post("abc".to_string());

        post.apply(PostChanges::new(None, "editor"));

        assert_eq!(post.name, "keep");
        assert_eq!(post.last_modified_by_user, "editor");
    }
}
