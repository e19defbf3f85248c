use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::DomainError;

/// Length of a store-assigned post id in hex digits (12 bytes).
pub const POST_ID_LEN: usize = 24;

/// Store-assigned post identifier: a 24-digit hexadecimal token.
///
/// Always held in lowercase so two spellings of the same id compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(String);

impl PostId {
    /// Parse a raw identifier, rejecting anything that is not 24 hex digits.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.len() == POST_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(DomainError::MalformedId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        id.0
    }
}

/// Post entity - a titled body of text with tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub published_date: DateTime<Utc>,
}

impl Post {
    /// Build a post from validated fields and the id the store assigned.
    pub fn new(id: PostId, fields: NewPost) -> Self {
        Self {
            id,
            title: fields.title,
            body: fields.body,
            tags: fields.tags,
            published_date: Utc::now(),
        }
    }

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
    }
}

/// Error code reported for an empty tag; carries the tag's `index`.
pub const EMPTY_TAG: &str = "empty_tag";

/// Every tag must be non-empty text.
fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    match tags.iter().position(|t| t.is_empty()) {
        Some(index) => {
            let mut err = ValidationError::new(EMPTY_TAG);
            err.add_param("index".into(), &index);
            Err(err)
        }
        None => Ok(()),
    }
}

/// Fields required to create a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

/// Partial update - every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.tags.is_none()
    }
}
