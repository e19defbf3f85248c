use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostId, PostPatch};
use crate::error::RepoError;

/// Post repository - the document store seen from the domain.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post; the store assigns its id.
    async fn create(&self, fields: NewPost) -> Result<Post, RepoError>;

    /// Every stored post, in the store's natural order.
    async fn find_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError>;

    /// Remove a post. Removing a missing id is not an error.
    async fn delete_by_id(&self, id: &PostId) -> Result<(), RepoError>;

    /// Apply `patch` and return the post as it is after the update.
    async fn update_by_id(&self, id: &PostId, patch: PostPatch)
    -> Result<Option<Post>, RepoError>;

    /// Short name of the backing store, reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
