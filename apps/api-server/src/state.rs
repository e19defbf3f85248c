//! Application state - shared across all handlers.

use std::sync::Arc;

use quire_core::error::RepoError;
use quire_core::ports::PostRepository;
use quire_infra::{DatabaseConfig, InMemoryPostRepository};

#[cfg(feature = "mongodb")]
use quire_infra::{DatabaseConnection, MongoPostRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    /// State over an explicit repository.
    pub fn with_repository(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Build the application state with the appropriate repository.
    ///
    /// A configured store that cannot be reached is an error; the in-memory
    /// repository is only used when no store is configured.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Result<Self, RepoError> {
        #[cfg(feature = "mongodb")]
        let posts: Arc<dyn PostRepository> = {
            if let Some(config) = db_config {
                let conn = DatabaseConnection::init(config).await.map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    RepoError::Connection(e.to_string())
                })?;
                Arc::new(MongoPostRepository::new(&conn))
            } else {
                tracing::warn!("MONGODB_URI not set. Running without database (in-memory mode).");
                Arc::new(InMemoryPostRepository::new())
            }
        };

        #[cfg(not(feature = "mongodb"))]
        let posts: Arc<dyn PostRepository> = {
            if db_config.is_some() {
                return Err(RepoError::Connection(
                    "MONGODB_URI is set but the server was built without the mongodb feature"
                        .to_string(),
                ));
            }
            tracing::info!("Running without mongodb feature - using in-memory repository");
            Arc::new(InMemoryPostRepository::new())
        };

        tracing::info!(storage = posts.backend(), "Application state initialized");

        Ok(Self::with_repository(posts))
    }
}
