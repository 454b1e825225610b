//! Post document as stored in the `posts` collection.

use bson::DateTime;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use posts_core::domain::{NewPost, Post};

pub const COLLECTION: &str = "posts";

/// Go's zero `time.Time`, found in `lastmodifieddate` of never-updated posts
/// written by previous deployments.
const ZERO_TIME_MILLIS: i64 = -62_135_596_800_000;

/// Field names match the documents already present in deployed collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "createddate")]
    pub created_date: DateTime,
    #[serde(
        rename = "lastmodifieddate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified_date: Option<DateTime>,
    #[serde(rename = "createdbyuser", default)]
    pub created_by_user: String,
    #[serde(rename = "lastmodifiedbyuser", default)]
    pub last_modified_by_user: String,
}

impl PostDocument {
    pub fn from_new(id: ObjectId, post: NewPost) -> Self {
        Self {
            id,
            name: post.name,
            created_date: DateTime::from_chrono(post.created_date),
            last_modified_date: None,
            created_by_user: post.created_by_user,
            last_modified_by_user: String::new(),
        }
    }
}

/// Conversion from a stored document to the domain Post.
impl From<PostDocument> for Post {
    fn from(document: PostDocument) -> Self {
        Self {
            id: document.id.to_hex(),
            name: document.name,
            created_date: document.created_date.to_chrono(),
            last_modified_date: document
                .last_modified_date
                .filter(|d| d.timestamp_millis() > ZERO_TIME_MILLIS)
                .map(|d| d.to_chrono()),
            created_by_user: document.created_by_user,
            last_modified_by_user: document.last_modified_by_user,
        }
    }
}

/// Parse a hex id, rejecting malformed input and the all-zero sentinel.
pub fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id)
        .ok()
        .filter(|oid| oid.bytes() != [0u8; 12])
}
