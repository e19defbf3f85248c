//! Post storage: MongoDB-backed and in-memory repositories.

mod connections;
mod memory;

#[cfg(feature = "mongodb")]
mod document;
#[cfg(feature = "mongodb")]
pub mod mongo_repo;

pub use connections::DatabaseConfig;
pub use memory::InMemoryPostRepository;

#[cfg(feature = "mongodb")]
pub use connections::DatabaseConnection;
#[cfg(feature = "mongodb")]
pub use mongo_repo::MongoPostRepository;
