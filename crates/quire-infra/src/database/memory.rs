//! In-memory post repository - used as fallback when MongoDB is not configured.

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use quire_core::domain::{NewPost, Post, PostId, PostPatch};
use quire_core::error::RepoError;
use quire_core::ports::PostRepository;

/// Posts kept in insertion order behind an async RwLock.
///
/// Ids are generated the same way the document store generates them.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    fn next_id() -> Result<PostId, RepoError> {
        PostId::parse(&ObjectId::new().to_hex()).map_err(|e| RepoError::Query(e.to_string()))
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, fields: NewPost) -> Result<Post, RepoError> {
        let post = Post::new(Self::next_id()?, fields);
        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.posts.read().await.clone())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| &p.id == id).cloned())
    }

    async fn delete_by_id(&self, id: &PostId) -> Result<(), RepoError> {
        self.posts.write().await.retain(|p| &p.id != id);
        Ok(())
    }

    async fn update_by_id(
        &self,
        id: &PostId,
        patch: PostPatch,
    ) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts.iter_mut().find(|p| &p.id == id).map(|post| {
            post.apply(patch);
            post.clone()
        }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
