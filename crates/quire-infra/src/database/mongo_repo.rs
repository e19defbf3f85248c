//! MongoDB repository implementation.

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;

use quire_core::domain::{NewPost, Post, PostId, PostPatch};
use quire_core::error::RepoError;
use quire_core::ports::PostRepository;

use super::connections::DatabaseConnection;
use super::document::{PostDocument, object_id, set_fields};

const DUPLICATE_KEY: i32 = 11000;

/// Posts stored as documents in a single collection.
#[derive(Clone)]
pub struct MongoPostRepository {
    collection: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(conn: &DatabaseConnection) -> Self {
        Self {
            collection: conn.db.collection(&conn.collection),
        }
    }
}

fn repo_error(err: mongodb::error::Error) -> RepoError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::Authentication { .. } => RepoError::Connection(err.to_string()),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
            RepoError::Constraint(err.to_string())
        }
        _ => RepoError::Query(err.to_string()),
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn create(&self, fields: NewPost) -> Result<Post, RepoError> {
        let doc = PostDocument::create(fields);
        self.collection.insert_one(&doc).await.map_err(repo_error)?;

        tracing::debug!(post_id = %doc.id, "Post inserted");
        Post::try_from(doc)
    }

    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let docs: Vec<PostDocument> = self
            .collection
            .find(doc! {})
            .await
            .map_err(repo_error)?
            .try_collect()
            .await
            .map_err(repo_error)?;

        docs.into_iter().map(Post::try_from).collect()
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, RepoError> {
        let oid = object_id(id)?;
        self.collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(repo_error)?
            .map(Post::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: &PostId) -> Result<(), RepoError> {
        let oid = object_id(id)?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(repo_error)?;

        tracing::debug!(post_id = %id, deleted = result.deleted_count, "Post delete");
        Ok(())
    }

    async fn update_by_id(
        &self,
        id: &PostId,
        patch: PostPatch,
    ) -> Result<Option<Post>, RepoError> {
        // An empty `$set` is rejected by the server.
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let oid = object_id(id)?;
        self.collection
            .find_one_and_update(doc! { "_id": oid }, set_fields(&patch))
            .return_document(ReturnDocument::After)
            .await
            .map_err(repo_error)?
            .map(Post::try_from)
            .transpose()
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
