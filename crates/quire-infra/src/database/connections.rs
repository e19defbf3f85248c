use std::time::Duration;

#[cfg(feature = "mongodb")]
use mongodb::{Client, Database, bson::doc, options::ClientOptions};

/// Configuration for the document store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout: Duration,
}

/// Connection to the MongoDB deployment holding the posts collection.
///
/// The driver keeps its own connection pool; cloning the client or the
/// database handle is cheap and shares that pool.
///
/// # Example
/// ```ignore
/// let conn = DatabaseConnection::init(&config).await?;
/// let repo = MongoPostRepository::new(&conn);
/// ```
#[cfg(feature = "mongodb")]
pub struct DatabaseConnection {
    pub client: Client,
    pub db: Database,
    pub collection: String,
}

#[cfg(feature = "mongodb")]
impl DatabaseConnection {
    /// Connect and ping the server so a bad URI fails at startup.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        tracing::info!("Initializing MongoDB connection...");

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some("quire".to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.min_pool_size = Some(config.min_pool_size);
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options)?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB connected (pool: {}..{})",
            config.min_pool_size,
            config.max_pool_size
        );

        Ok(Self {
            client,
            db,
            collection: config.collection.clone(),
        })
    }
}
