//! Default data written on first start.

use chrono::Utc;

use crate::domain::Post;
use crate::error::RepoError;
use crate::ports::PostRepository;

/// User the default posts are attributed to.
pub const SEED_USER: &str = "default@admin.com";

/// Fixed ids so that concurrent first starts collide on the store's `_id` index
/// instead of inserting the defaults twice.
const DEFAULT_POSTS: [(&str, &str); 2] = [
    ("5eed00000000000000000001", "Golang"),
    ("5eed00000000000000000002", "Test"),
];

/// The default posts, stamped with the current time.
pub fn default_posts() -> Vec<Post> {
    let now = Utc::now();
    DEFAULT_POSTS
        .iter()
        .map(|(id, name)| Post {
            id: id.to_string(),
            name: name.to_string(),
            created_date: now,
            last_modified_date: None,
            created_by_user: SEED_USER.to_string(),
            last_modified_by_user: String::new(),
        })
        .collect()
}

/// Insert the default posts when the collection is empty.
///
/// Returns how many posts this call inserted.
pub async fn seed_default_posts(repo: &dyn PostRepository) -> Result<usize, RepoError> {
    if repo.count().await? > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for post in default_posts() {
        if repo.insert_if_absent(post).await? {
            inserted += 1;
        }
    }
    Ok(inserted)
}
