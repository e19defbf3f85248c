//! BSON shape of a stored post.

use bson::{Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use quire_core::domain::{NewPost, Post, PostId, PostPatch};
use quire_core::error::RepoError;

/// A post as it sits in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: bson::DateTime,
}

impl PostDocument {
    /// New document with a freshly generated id.
    pub fn create(fields: NewPost) -> Self {
        Self {
            id: ObjectId::new(),
            title: fields.title,
            body: fields.body,
            tags: fields.tags,
            published_date: bson::DateTime::now(),
        }
    }
}

impl TryFrom<PostDocument> for Post {
    type Error = RepoError;

    fn try_from(doc: PostDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PostId::parse(&doc.id.to_hex()).map_err(|e| RepoError::Query(e.to_string()))?,
            title: doc.title,
            body: doc.body,
            tags: doc.tags,
            published_date: doc.published_date.to_chrono(),
        })
    }
}

/// Store id for a validated post id.
pub fn object_id(id: &PostId) -> Result<ObjectId, RepoError> {
    ObjectId::parse_str(id.as_str()).map_err(|e| RepoError::Query(e.to_string()))
}

/// `$set` body for a partial update; only the provided fields appear.
pub fn set_fields(patch: &PostPatch) -> Document {
    let mut set = Document::new();
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(body) = &patch.body {
        set.insert("body", body.as_str());
    }
    if let Some(tags) = &patch.tags {
        set.insert("tags", tags.clone());
    }
    doc! { "$set": set }
}
